//! Inline frame rendering for notebook front-ends
//!
//! Frames are encoded as 24-bit BMP, embedded in an HTML `<img>` tag, and
//! emitted through the evcxr display protocol so a Rust Jupyter kernel shows
//! them inline. Any other front-end can use [`render_frame`] directly.

use crate::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::Write;

const BMP_HEADER_LEN: usize = 14 + 40;

/// One RGB8 animation frame, rows top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    /// Wrap `pixels` (`width * height * 3` bytes, row-major RGB)
    ///
    /// Dimensions must fit a BMP header: each side at most `i32::MAX` and the
    /// encoded file at most `u32::MAX` bytes.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(Error::InvalidParameter(format!(
                "{width}x{height} RGB frame needs {expected} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Frame filled with a single colour
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self> {
        check_dimensions(width, height)?;
        let pixels = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGB value at (x, y), origin top-left
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    let limit = i32::MAX as u32;
    if width > limit || height > limit {
        return Err(Error::InvalidParameter(format!(
            "{width}x{height} frame exceeds the BMP side limit of {limit}"
        )));
    }
    let file_len = (u64::from(width) * 3).div_ceil(4) * 4 * u64::from(height)
        + BMP_HEADER_LEN as u64;
    if file_len > u64::from(u32::MAX) {
        return Err(Error::InvalidParameter(format!(
            "{width}x{height} frame needs a {file_len}-byte BMP, over the 4 GiB limit"
        )));
    }
    Ok(())
}

/// Encode a frame as an uncompressed 24-bit BMP
pub fn encode_bmp(frame: &Frame) -> Vec<u8> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let row_len = (width * 3).div_ceil(4) * 4;
    let image_len = row_len * height;
    let file_len = BMP_HEADER_LEN + image_len;

    let mut out = Vec::with_capacity(file_len);

    // BITMAPFILEHEADER
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_len as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(BMP_HEADER_LEN as u32).to_le_bytes());

    // BITMAPINFOHEADER
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&(frame.width as i32).to_le_bytes());
    out.extend_from_slice(&(frame.height as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(image_len as u32).to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());

    // Bottom-up rows, BGR, padded to 4 bytes
    if width == 0 {
        return out;
    }
    let padding = row_len - width * 3;
    for row in frame.pixels.chunks_exact(width * 3).rev() {
        for px in row.chunks_exact(3) {
            out.extend_from_slice(&[px[2], px[1], px[0]]);
        }
        out.extend(std::iter::repeat(0u8).take(padding));
    }

    out
}

/// HTML `<img>` fragment with the frame inlined as a data URI
pub fn render_frame(frame: &Frame) -> String {
    format!(
        r#"<img width="{}" height="{}" style="image-rendering: pixelated" src="data:image/bmp;base64,{}"/>"#,
        frame.width,
        frame.height,
        STANDARD.encode(encode_bmp(frame))
    )
}

/// Write frames using the evcxr display protocol
pub fn display_frames<'a, W, I>(frames: I, mut out: W) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Frame>,
{
    for frame in frames {
        writeln!(out, "EVCXR_BEGIN_CONTENT text/html")?;
        writeln!(out, "{}", render_frame(frame))?;
        writeln!(out, "EVCXR_END_CONTENT")?;
    }
    out.flush()?;
    Ok(())
}
