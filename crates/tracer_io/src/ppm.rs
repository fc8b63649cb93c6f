//! ASCII PPM (P3) writing.

use std::io::{self, Write};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum PpmError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Writes `rgb` (row-major, top-to-bottom, 3 bytes per pixel) as an ASCII
/// PPM: `P3`, then `width height`, then `255`, then one `r g b` line per
/// pixel in row-major order.
pub fn write_ppm(path: impl AsRef<Path>, width: usize, height: usize, rgb: &[u8]) -> Result<(), PpmError> {
    debug_assert_eq!(rgb.len(), width * height * 3);

    let mut out = String::with_capacity(16 + width * height * 12);
    out.push_str(&format!("P3\n{width} {height}\n255\n"));
    for pixel in rgb.chunks_exact(3) {
        out.push_str(&format!("{} {} {}\n", pixel[0], pixel[1], pixel[2]));
    }

    let mut file = std::fs::File::create(path)?;
    file.write_all(out.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_the_expected_header_and_body() {
        let rgb = [255u8, 0, 0, 0, 255, 0, 0, 0, 255, 1, 2, 3];
        let path = std::env::temp_dir().join("tracer_io_ppm_write_test.ppm");
        write_ppm(&path, 2, 2, &rgb).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let expected = "P3\n2 2\n255\n255 0 0\n0 255 0\n0 0 255\n1 2 3\n";
        assert_eq!(contents, expected);
    }
}
