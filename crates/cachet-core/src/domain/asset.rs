//! Uploaded assets and the file-type allow-list.

use serde::{Deserialize, Serialize};

/// A file accepted by the upload gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAsset {
    /// Generated name under the upload directory.
    pub stored_name: String,
    /// Name the client declared.
    pub original_name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

/// The file types uploads are allowed to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Jpeg,
    Png,
    Gif,
    Pdf,
}

impl FileKind {
    pub const ALL: [Self; 4] = [Self::Jpeg, Self::Png, Self::Gif, Self::Pdf];

    /// Looks up a kind by extension (with or without the leading dot).
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Looks up a kind by the subtype of a MIME type such as `image/png`.
    ///
    /// Parameters (`; charset=...`) are ignored.
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        let (_, subtype) = essence.split_once('/')?;
        match subtype.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Canonical content type used when serving the file back.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Pdf => "application/pdf",
        }
    }
}

/// Extension of the final path component including the dot, the way
/// `.png` is the extension of `photo.png`.
///
/// Dotfiles (`.env`) and names without a dot have no extension.
#[must_use]
pub fn extension_of(name: &str) -> &str {
    let base = name.rsplit(&['/', '\\'][..]).next().unwrap_or(name);
    match base.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &base[idx..],
    }
}
