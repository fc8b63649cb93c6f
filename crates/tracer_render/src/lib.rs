//! Acceleration and parallel rendering on top of `tracer_core`'s scene
//! model: a surface-area-heuristic KD-tree and a tiled multi-threaded
//! sampler.

pub mod kdtree;
pub mod renderer;

pub use kdtree::{AccelError, KdTree};
pub use renderer::{render, render_into, FrameBuffer};
