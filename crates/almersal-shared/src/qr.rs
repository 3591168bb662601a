//! QR codes printed on receipts.
//!
//! The payload is the plain decimal internal id, nothing else. The image is
//! stored alongside the record as a PNG data URL so receipts can be
//! re-printed without re-rendering.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;

use crate::constants::QR_MIN_DIMENSION;
use crate::error::QrError;

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Text encoded in the QR code for a given remittance.
pub fn qr_payload(internal_id: i64) -> String {
    internal_id.to_string()
}

/// Render the QR code for `internal_id` as PNG bytes.
pub fn render_qr_png(internal_id: i64) -> Result<Vec<u8>, QrError> {
    let code = QrCode::new(qr_payload(internal_id).as_bytes())?;
    let img = code
        .render::<Luma<u8>>()
        .min_dimensions(QR_MIN_DIMENSION, QR_MIN_DIMENSION)
        .build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(img).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

/// Render the QR code for `internal_id` as a `data:image/png;base64,...` URL.
pub fn render_qr_data_url(internal_id: i64) -> Result<String, QrError> {
    let png = render_qr_png(internal_id)?;
    Ok(format!("{DATA_URL_PREFIX}{}", STANDARD.encode(png)))
}

/// Extract the PNG bytes from a data URL produced by [`render_qr_data_url`].
pub fn png_from_data_url(data_url: &str) -> Option<Vec<u8>> {
    let encoded = data_url.strip_prefix(DATA_URL_PREFIX)?;
    STANDARD.decode(encoded).ok()
}
