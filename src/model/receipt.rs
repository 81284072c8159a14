//! Receipts are attached to transactions as `data:` URLs so that they live inside the snapshot.

use crate::Result;
use anyhow::{bail, Context};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

/// Encodes `bytes` as a `data:<mime>;base64,<payload>` URL. The mime type is derived from the
/// extension of `file_name`.
pub fn encode(file_name: &Path, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_for(file_name), STANDARD.encode(bytes))
}

/// A decoded receipt.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Decoded {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Decoded {
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// Decodes a `data:` URL produced by `encode` (or by a browser file reader).
pub fn decode(data_url: &str) -> Result<Decoded> {
    let Some(rest) = data_url.strip_prefix("data:") else {
        bail!("The receipt is not a data URL");
    };
    let (meta, payload) = rest
        .split_once(',')
        .context("The receipt data URL has no payload")?;
    let Some(mime) = meta.strip_suffix(";base64") else {
        bail!("Only base64 receipts are supported, got '{meta}'");
    };
    let bytes = STANDARD
        .decode(payload)
        .context("The receipt payload is not valid base64")?;
    Ok(Decoded {
        mime: mime.to_string(),
        bytes,
    })
}

fn mime_for(file_name: &Path) -> &'static str {
    let ext = file_name
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// The file extension to use when writing a decoded receipt back to disk.
pub fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "application/pdf" => "pdf",
        _ => "bin",
    }
}
