//! QR code rendering for member login links.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use qrcode::{render::svg, EcLevel, QrCode};

/// Path segment a client resolves QR login tokens against.
pub const QR_LOGIN_PATH: &str = "qr-login";

/// QR material generated for one member.
#[derive(Debug, Clone)]
pub struct QrBundle {
    /// The URL encoded in the QR code.
    pub login_url: String,
    /// The rendered code as an `<img>`-ready SVG data URL.
    pub svg_data_url: String,
}

/// Builds the login URL for a signed token and renders it as a QR code.
/// `base_url` must end with a slash (config normalizes this).
pub fn login_qr(base_url: &str, token: &str) -> anyhow::Result<QrBundle> {
    let login_url = format!("{}{}/{}", base_url, QR_LOGIN_PATH, token);

    let code = QrCode::with_error_correction_level(login_url.as_bytes(), EcLevel::L)
        .map_err(|e| anyhow::anyhow!("Failed to encode QR code: {}", e))?;
    let rendered = code
        .render::<svg::Color>()
        .min_dimensions(240, 240)
        .build();

    Ok(QrBundle {
        login_url,
        svg_data_url: svg_to_data_url(&rendered),
    })
}

fn svg_to_data_url(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", BASE64.encode(svg))
}
