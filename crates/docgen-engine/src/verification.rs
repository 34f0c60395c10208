//! Verification artifacts for generated documents
//!
//! A finalized document embeds a scannable reference back to its own
//! retrieval endpoint, so a printed copy can be checked against the stored
//! original. The QR code is rendered as an SVG data URL and injected into
//! the template payload alongside the document id.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};

use crate::error::EngineError;

/// Externally reachable retrieval path for a document id.
pub fn verification_url(public_base_url: &str, document_id: &str) -> String {
    format!(
        "{}/api/verify/{}",
        public_base_url.trim_end_matches('/'),
        document_id
    )
}

/// Encode `data` as a QR code and return it as an SVG data URL suitable for
/// an `<img src="...">` in a template.
///
/// High error correction and a 200px minimum so the code survives print
/// and re-scan.
pub fn qr_svg_data_url(data: &str) -> Result<String, EngineError> {
    let code = QrCode::with_error_correction_level(data, EcLevel::H)
        .map_err(|e| EngineError::Render(format!("QR encoding failed: {e}")))?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(200, 200)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();
    Ok(format!("data:image/svg+xml;base64,{}", BASE64.encode(image)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_doubled_slashes() {
        assert_eq!(
            verification_url("http://localhost:3000/", "0a1b2c3d4e5f"),
            "http://localhost:3000/api/verify/0a1b2c3d4e5f"
        );
        assert_eq!(
            verification_url("https://docs.example.com", "0a1b2c3d4e5f"),
            "https://docs.example.com/api/verify/0a1b2c3d4e5f"
        );
    }

    #[test]
    fn qr_data_url_decodes_to_svg() {
        let url = qr_svg_data_url("http://localhost:3000/api/verify/0a1b2c3d4e5f").unwrap();

        let payload = url
            .strip_prefix("data:image/svg+xml;base64,")
            .expect("data URL prefix");
        let svg = String::from_utf8(BASE64.decode(payload).unwrap()).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn qr_encoding_is_deterministic() {
        let a = qr_svg_data_url("same input").unwrap();
        let b = qr_svg_data_url("same input").unwrap();
        assert_eq!(a, b);
    }
}
