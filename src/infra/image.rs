//! Loads image attachments from disk as `data:` URIs.

use std::{
    fs,
    path::{Path, PathBuf},
};

use base64::Engine as _;
use thiserror::Error;

use crate::domain::message_input_state::Attachment;

const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("{path} is not an image file")]
    NotAnImage { path: PathBuf },
    #[error("{path} is larger than {limit} bytes")]
    TooLarge { path: PathBuf, limit: u64 },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reads `path` and encodes it as `data:<mime>;base64,...`.
///
/// Only files with an image extension are accepted.
pub fn load_attachment(path: &Path) -> Result<Attachment, ImageError> {
    let mime = image_mime_type(path).ok_or_else(|| ImageError::NotAnImage {
        path: path.to_path_buf(),
    })?;

    let read_error = |source| ImageError::Read {
        path: path.to_path_buf(),
        source,
    };

    let size = fs::metadata(path).map_err(read_error)?.len();
    if size > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge {
            path: path.to_path_buf(),
            limit: MAX_IMAGE_BYTES,
        });
    }

    let bytes = fs::read(path).map_err(read_error)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);

    Ok(Attachment {
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        data_uri: format!("data:{mime};base64,{encoded}"),
    })
}

fn image_mime_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_png_as_data_uri() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("Cat.PNG");
        fs::write(&path, [0x89, b'P', b'N', b'G']).expect("fixture should be written");

        let attachment = load_attachment(&path).expect("image should load");

        assert_eq!(attachment.file_name, "Cat.PNG");
        assert_eq!(attachment.data_uri, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn rejects_non_image_files_before_reading() {
        let error = load_attachment(Path::new("/definitely/missing/notes.txt"))
            .expect_err("text file must be rejected");

        assert!(matches!(error, ImageError::NotAnImage { .. }));
    }

    #[test]
    fn missing_image_reports_read_error() {
        let error = load_attachment(Path::new("/definitely/missing/photo.jpg"))
            .expect_err("missing file must fail");

        assert!(matches!(error, ImageError::Read { .. }));
    }
}
