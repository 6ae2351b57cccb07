use std::fmt;
use std::path::{Path, PathBuf};

use crate::assets::bitmap::Bitmap;
use crate::foundation::error::{FourcutError, FourcutResult};

/// Where a source image comes from.
#[derive(Clone, Debug)]
pub enum ImageSource {
    /// `http` or `https` URL.
    Remote(url::Url),
    /// Local file on disk.
    File(PathBuf),
    /// Already-decoded bitmap; never goes through a fetcher.
    Bitmap(Bitmap),
}

impl ImageSource {
    /// Parse a textual reference at position `index` of a request.
    ///
    /// Accepts `http(s)://` and `file://` URLs, and plain filesystem paths. Relative paths are
    /// resolved against `base_dir` when given.
    pub fn parse(index: usize, reference: &str, base_dir: Option<&Path>) -> FourcutResult<Self> {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return Err(FourcutError::invalid_reference(
                index,
                reference,
                "reference is empty",
            ));
        }

        if trimmed.contains("://") {
            let url = url::Url::parse(trimmed)
                .map_err(|e| FourcutError::invalid_reference(index, reference, e.to_string()))?;
            return match url.scheme() {
                "http" | "https" => {
                    if url.host_str().is_none_or(str::is_empty) {
                        return Err(FourcutError::invalid_reference(
                            index,
                            reference,
                            "url has no host",
                        ));
                    }
                    Ok(Self::Remote(url))
                }
                "file" => url.to_file_path().map(Self::File).map_err(|()| {
                    FourcutError::invalid_reference(index, reference, "file url is not a local path")
                }),
                other => Err(FourcutError::invalid_reference(
                    index,
                    reference,
                    format!("unsupported scheme '{other}'"),
                )),
            };
        }

        let path = PathBuf::from(trimmed);
        let path = match base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        };
        Ok(Self::File(path))
    }

    pub fn is_resident(&self) -> bool {
        matches!(self, Self::Bitmap(_))
    }
}

impl From<Bitmap> for ImageSource {
    fn from(value: Bitmap) -> Self {
        Self::Bitmap(value)
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Bitmap(b) => write!(f, "<bitmap {}x{}>", b.width, b.height),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
