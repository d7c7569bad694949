use std::io::Cursor;

use base64ct::{Base64, Encoding};
use image::{ImageBuffer, ImageFormat, Rgb};
use qrcode::{Color, EcLevel, QrCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QrError {
    #[error("qr encode: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("png encode: {0}")]
    Png(#[from] image::ImageError),
}

#[derive(Debug, Clone)]
pub struct QrOptions {
    pub ec_level: EcLevel,
    /// Quiet zone around the symbol, in modules.
    pub margin: u32,
    /// Pixels per module.
    pub scale: u32,
    pub dark: [u8; 3],
    pub light: [u8; 3],
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            ec_level: EcLevel::H,
            margin: 1,
            scale: 4,
            dark: [0x0e, 0x74, 0x90],
            light: [0xff, 0xff, 0xff],
        }
    }
}

/// Renders `text` as a PNG QR code and returns it as a `data:` URL.
pub fn encode_data_url(text: &str, opts: &QrOptions) -> Result<String, QrError> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), opts.ec_level)?;
    let png = render_png(&code, opts)?;
    Ok(format!("data:image/png;base64,{}", Base64::encode_string(&png)))
}

fn render_png(code: &QrCode, opts: &QrOptions) -> Result<Vec<u8>, QrError> {
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let scale = opts.scale.max(1);
    let side = (modules + 2 * opts.margin) * scale;

    let img = ImageBuffer::from_fn(side, side, |x, y| {
        let (mx, my) = (x / scale, y / scale);
        let inside = mx >= opts.margin
            && my >= opts.margin
            && mx < opts.margin + modules
            && my < opts.margin + modules;
        let dark = inside
            && colors[((my - opts.margin) * modules + (mx - opts.margin)) as usize] == Color::Dark;
        if dark {
            Rgb(opts.dark)
        } else {
            Rgb(opts.light)
        }
    });

    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
