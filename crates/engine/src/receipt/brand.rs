use std::{fmt, fs, path::Path};

use base64::{Engine as _, engine::general_purpose::STANDARD};

pub const DEFAULT_BRAND_TEXT: &str = "Concrete Pour Tracker";

/// Receipt header mark: a logo image, or a text fallback.
#[derive(Clone, PartialEq, Eq)]
pub enum BrandMark {
    Image { mime: &'static str, bytes: Vec<u8> },
    Text(String),
}

impl Default for BrandMark {
    fn default() -> Self {
        Self::Text(DEFAULT_BRAND_TEXT.to_string())
    }
}

impl fmt::Debug for BrandMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image { mime, bytes } => f
                .debug_struct("Image")
                .field("mime", mime)
                .field("len", &bytes.len())
                .finish(),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
        }
    }
}

impl BrandMark {
    /// Loads a logo from disk. A missing path, an unreadable file or an
    /// unknown image type falls back to the text mark; the receipt is never
    /// blocked by the logo.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        let Some(mime) = mime_for(path) else {
            tracing::warn!(path = %path.display(), "unsupported brand image type, using text");
            return Self::default();
        };
        match fs::read(path) {
            Ok(bytes) if !bytes.is_empty() => Self::Image { mime, bytes },
            Ok(_) => {
                tracing::warn!(path = %path.display(), "brand image is empty, using text");
                Self::default()
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "cannot read brand image: {err}");
                Self::default()
            }
        }
    }

    /// `data:` URI for an image mark.
    #[must_use]
    pub fn data_uri(&self) -> Option<String> {
        match self {
            Self::Image { mime, bytes } => {
                Some(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
            }
            Self::Text(_) => None,
        }
    }

    /// Text shown where an image cannot be.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Image { .. } => DEFAULT_BRAND_TEXT,
            Self::Text(text) => text,
        }
    }
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
