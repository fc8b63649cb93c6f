#![doc = include_str!("../README.md")]

pub use tracer_app::{config::Config, run};
pub use tracer_core as core;
pub use tracer_io as io;
pub use tracer_render as render;
