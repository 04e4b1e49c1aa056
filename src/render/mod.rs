use std::io::Cursor;

use image::imageops::FilterType;
use image::{GenericImageView, ImageReader};

use crate::core::error::RenderError;

/// Luminance ramp from darkest to lightest cell.
const LUMA_RAMP: &[u8] = b"@%#*+=-:. ";

/// Terminal cells are roughly twice as tall as they are wide, so rows are
/// halved to keep the image aspect.
const CELL_ASPECT: f32 = 2.0;

/// Render encoded image bytes as ASCII art, `columns` characters wide.
pub fn to_text(bytes: &[u8], columns: u32) -> Result<String, RenderError> {
    if bytes.is_empty() {
        return Err(RenderError::EmptyInput);
    }
    if columns == 0 {
        return Err(RenderError::ZeroColumns);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| RenderError::UnknownFormat(e.to_string()))?;
    let decoded = reader
        .decode()
        .map_err(|e| RenderError::Decode(e.to_string()))?;

    let gray = decoded.grayscale();
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return Err(RenderError::ZeroDimensions);
    }

    let rows = ((height as f32) * (columns as f32) / (width as f32) / CELL_ASPECT)
        .max(1.0) as u32;
    let resized = gray.resize_exact(columns, rows, FilterType::Lanczos3);
    let pixels = resized.as_luma8().ok_or_else(|| {
        RenderError::Decode("resized image has no 8-bit grayscale representation".into())
    })?;

    let mut out = String::with_capacity(((columns + 1) * rows) as usize);
    for y in 0..rows {
        for x in 0..columns {
            let luma = pixels.get_pixel(x, y)[0] as f32;
            let ratio = (luma / 255.0).clamp(0.0, 1.0);
            let idx = ((ratio * (LUMA_RAMP.len() - 1) as f32).round() as usize)
                .min(LUMA_RAMP.len() - 1);
            out.push(LUMA_RAMP[idx] as char);
        }
        out.push('\n');
    }

    Ok(out)
}
