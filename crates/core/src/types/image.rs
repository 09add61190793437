//! Uploaded product image filenames.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Extensions accepted for product images (compared case-insensitively).
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Longest sanitized filename; matches the `products.image` column.
pub const MAX_IMAGE_FILENAME_LENGTH: usize = 150;

/// Errors that can occur when accepting an uploaded filename.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageFilenameError {
    /// Nothing usable is left after sanitization.
    #[error("image filename is empty")]
    Empty,
    /// The extension is missing or not an allowed image type.
    #[error("image must be one of: png, jpg, jpeg, webp")]
    DisallowedExtension,
    /// The sanitized name does not fit the catalog column.
    #[error("image filename must be at most {MAX_IMAGE_FILENAME_LENGTH} characters")]
    TooLong,
}

/// A sanitized image filename that is safe to join onto the upload directory.
///
/// Sanitization drops any directory components, turns whitespace runs into
/// `_`, keeps only ASCII alphanumerics and `._-`, and strips leading and
/// trailing dots and underscores.
///
/// ```
/// use greengrocer_core::ImageFilename;
///
/// let name = ImageFilename::sanitize("../../etc/My Tomato.PNG").unwrap();
/// assert_eq!(name.as_str(), "etc_My_Tomato.PNG");
/// assert!(ImageFilename::sanitize("setup.exe").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ImageFilename(String);

impl ImageFilename {
    /// Sanitize a client-supplied filename and check its extension.
    ///
    /// # Errors
    ///
    /// Returns `ImageFilenameError::Empty` when nothing survives
    /// sanitization and `ImageFilenameError::DisallowedExtension` when the
    /// extension is not an allowed image type. Names longer than
    /// [`MAX_IMAGE_FILENAME_LENGTH`] after sanitization give
    /// `ImageFilenameError::TooLong`.
    pub fn sanitize(raw: &str) -> Result<Self, ImageFilenameError> {
        let flattened = raw.replace(['/', '\\'], " ");
        let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
        let kept: String = joined
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            .collect();
        let cleaned = kept.trim_matches(|c| c == '.' || c == '_');

        if cleaned.is_empty() {
            return Err(ImageFilenameError::Empty);
        }

        if !has_allowed_extension(cleaned) {
            return Err(ImageFilenameError::DisallowedExtension);
        }

        // ASCII only at this point, so bytes == chars.
        if cleaned.len() > MAX_IMAGE_FILENAME_LENGTH {
            return Err(ImageFilenameError::TooLong);
        }

        Ok(Self(cleaned.to_owned()))
    }

    /// Wrap a filename already stored in the database.
    #[must_use]
    pub const fn from_stored(name: String) -> Self {
        Self(name)
    }

    /// Returns the filename as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whether `name` ends in one of [`ALLOWED_IMAGE_EXTENSIONS`].
#[must_use]
pub fn has_allowed_extension(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.is_empty()
            && ALLOWED_IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
    })
}

impl fmt::Display for ImageFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ImageFilename {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        for name in ["a.png", "a.jpg", "a.JPEG", "a.WebP"] {
            assert!(ImageFilename::sanitize(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_disallowed_extensions() {
        for name in ["a.exe", "a.gif", "png", "a.png.exe", "noext"] {
            assert_eq!(
                ImageFilename::sanitize(name),
                Err(ImageFilenameError::DisallowedExtension),
                "{name}"
            );
        }
    }

    #[test]
    fn test_strips_directories() {
        let name = ImageFilename::sanitize("/var/www/../carrot.jpg").unwrap();
        assert_eq!(name.as_str(), "var_www_.._carrot.jpg");
        let name = ImageFilename::sanitize("C:\\Users\\me\\beet.png").unwrap();
        assert_eq!(name.as_str(), "C_Users_me_beet.png");
    }

    #[test]
    fn test_whitespace_and_symbols() {
        let name = ImageFilename::sanitize("  fresh  okra (1).png ").unwrap();
        assert_eq!(name.as_str(), "fresh_okra_1.png");
    }

    #[test]
    fn test_leading_dots_removed() {
        let name = ImageFilename::sanitize("...hidden.png").unwrap();
        assert_eq!(name.as_str(), "hidden.png");
    }

    #[test]
    fn test_length_limit() {
        let fits = format!("{}.png", "a".repeat(MAX_IMAGE_FILENAME_LENGTH - 4));
        assert_eq!(ImageFilename::sanitize(&fits).unwrap().as_str(), fits);

        let long = format!("{}.png", "a".repeat(200));
        assert_eq!(
            ImageFilename::sanitize(&long),
            Err(ImageFilenameError::TooLong)
        );
    }

    #[test]
    fn test_empty_after_sanitize() {
        assert_eq!(
            ImageFilename::sanitize("../"),
            Err(ImageFilenameError::Empty)
        );
        assert_eq!(ImageFilename::sanitize("   "), Err(ImageFilenameError::Empty));
    }
}
