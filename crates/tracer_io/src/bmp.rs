//! 24-bit uncompressed BMP (`BITMAPFILEHEADER` + `BITMAPINFOHEADER`) reading
//! and writing.
//!
//! The reference writes a negative `pixelHeight` (a top-down pixel array)
//! but then still emits rows bottom-to-top, which would flip any image it
//! writes when read back by a standards-compliant reader. This writer keeps
//! the negative-height, 24-bit, `BI_RGB` header contract but emits rows in
//! the order the height sign actually promises; the reader honors the sign
//! of `pixelHeight` the same way, so a file this writer produces round-trips.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;

const ID_BM: u16 = 0x4D42;
const BI_RGB: u32 = 0;
const HEADER_LEN: usize = 0x36;
const DIB_HEADER_LEN: u32 = 40;

#[derive(Debug, thiserror::Error)]
pub enum BmpError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("not a BMP file (bad magic)")]
    BadMagic,
    #[error("unsupported BMP variant: {0}")]
    Unsupported(&'static str),
}

fn row_padding(width: usize) -> usize {
    (4 - (width * 3) % 4) % 4
}

/// Writes `rgb` (row-major, top-to-bottom, 3 bytes per pixel) as a 24-bit
/// BMP with a negative (top-down) height.
pub fn write_bmp(path: impl AsRef<Path>, width: usize, height: usize, rgb: &[u8]) -> Result<(), BmpError> {
    debug_assert_eq!(rgb.len(), width * height * 3);

    let pad = row_padding(width);
    let bytes_per_row = width * 3 + pad;
    let bitmap_size = (bytes_per_row * height) as u32;
    let file_size = HEADER_LEN as u32 + bitmap_size;

    let mut out = Vec::with_capacity(HEADER_LEN + bytes_per_row * height);

    out.extend_from_slice(&ID_BM.to_le_bytes());
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&(HEADER_LEN as u32).to_le_bytes());

    out.extend_from_slice(&DIB_HEADER_LEN.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(-(height as i32)).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&BI_RGB.to_le_bytes());
    out.extend_from_slice(&bitmap_size.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());

    debug_assert_eq!(out.len(), HEADER_LEN);

    let padding = [0u8; 4];
    for row in 0..height {
        let row_start = row * width * 3;
        let row_bytes = &rgb[row_start..row_start + width * 3];
        for pixel in row_bytes.chunks_exact(3) {
            // BMP pixel order is BGR.
            out.push(pixel[2]);
            out.push(pixel[1]);
            out.push(pixel[0]);
        }
        out.extend_from_slice(&padding[..pad]);
    }

    let path = path.as_ref();
    debug!("writing {width}x{height} BMP to {}", path.display());
    let mut file = std::fs::File::create(path)?;
    file.write_all(&out)?;
    Ok(())
}

/// Reads a 24-bit, uncompressed BMP into `(width, height, rgb)`, `rgb` being
/// row-major and top-to-bottom regardless of the file's row order.
pub fn read_bmp(path: impl AsRef<Path>) -> Result<(usize, usize, Vec<u8>), BmpError> {
    let path = path.as_ref();
    debug!("reading BMP from {}", path.display());
    let mut file = std::fs::File::open(path)?;
    let mut header = [0u8; HEADER_LEN];
    file.read_exact(&mut header)?;

    let id = u16::from_le_bytes([header[0], header[1]]);
    if id != ID_BM {
        return Err(BmpError::BadMagic);
    }

    let pixel_array_offset = u32::from_le_bytes(header[10..14].try_into().unwrap());
    let width = i32::from_le_bytes(header[18..22].try_into().unwrap());
    let height_field = i32::from_le_bytes(header[22..26].try_into().unwrap());
    let bits_per_pixel = u16::from_le_bytes(header[28..30].try_into().unwrap());
    let compression = u32::from_le_bytes(header[30..34].try_into().unwrap());

    if bits_per_pixel != 24 {
        return Err(BmpError::Unsupported("only 24 bpp BMPs are supported"));
    }
    if compression != BI_RGB {
        return Err(BmpError::Unsupported("only uncompressed BI_RGB BMPs are supported"));
    }

    let width = width as usize;
    let top_down = height_field < 0;
    let height = height_field.unsigned_abs() as usize;

    let pad = row_padding(width);
    let mut rgb = vec![0u8; width * height * 3];

    file.seek(SeekFrom::Start(pixel_array_offset as u64))?;

    for file_row in 0..height {
        let mem_row = if top_down { file_row } else { height - 1 - file_row };
        let mut row_buf = vec![0u8; width * 3];
        file.read_exact(&mut row_buf)?;
        for (pixel, chunk) in row_buf.chunks_exact(3).enumerate() {
            let dst = (mem_row * width + pixel) * 3;
            rgb[dst] = chunk[2];
            rgb[dst + 1] = chunk[1];
            rgb[dst + 2] = chunk[0];
        }
        if pad > 0 {
            let mut skip = [0u8; 4];
            file.read_exact(&mut skip[..pad])?;
        }
    }

    Ok((width, height, rgb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_a_temp_file() {
        let width = 4;
        let height = 3;
        let mut rgb = vec![0u8; width * height * 3];
        for (i, px) in rgb.chunks_exact_mut(3).enumerate() {
            px[0] = i as u8;
            px[1] = (i * 2) as u8;
            px[2] = (i * 3) as u8;
        }

        let path = std::env::temp_dir().join("tracer_io_bmp_roundtrip_test.bmp");
        write_bmp(&path, width, height, &rgb).unwrap();
        let (rw, rh, read_back) = read_bmp(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(rw, width);
        assert_eq!(rh, height);
        assert_eq!(read_back, rgb);
    }

    #[test]
    fn row_padding_rounds_up_to_four_bytes() {
        assert_eq!(row_padding(1), 1); // 3 bytes -> pad 1
        assert_eq!(row_padding(4), 0); // 12 bytes -> pad 0
        assert_eq!(row_padding(5), 2); // 15 bytes -> pad 2
    }
}
