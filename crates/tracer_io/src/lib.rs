//! Image and mesh file formats: 24-bit BMP, ASCII PPM, and Wavefront OBJ.
//! No direct counterpart in `tracer_core`/`tracer_render`; pulled out as its
//! own leaf crate since codecs have no business knowing about materials or
//! acceleration structures.

pub mod bmp;
pub mod obj;
pub mod ppm;

pub use bmp::{BmpError, read_bmp, write_bmp};
pub use obj::{ObjError, load_obj, place_triangles};
pub use ppm::{PpmError, write_ppm};
