use std::fmt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{ImageError, Result};

/// Body of `POST /v1/images/generations`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub n: NonZeroU32,
    pub size: ImageSize,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            n: NonZeroU32::MIN,
            size: ImageSize::default(),
        }
    }

    pub fn with_count(mut self, n: NonZeroU32) -> Self {
        self.n = n;
        self
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidRequest(format!(
                "image size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ImageSize {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid =
            || ImageError::InvalidRequest(format!("size must look like 1024x1024, got {s:?}"));

        let (width, height) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = width.parse().map_err(|_| invalid())?;
        let height = height.parse().map_err(|_| invalid())?;
        Self::new(width, height)
    }
}

impl Serialize for ImageSize {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub data: Vec<ImageDatum>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageDatum {
    pub url: Option<String>,
    pub b64_json: Option<String>,
    pub revised_prompt: Option<String>,
}

/// Where the image bytes of a single result live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    Url(String),
    Inline(String),
}

impl TryFrom<ImageDatum> for ImagePayload {
    type Error = ImageError;

    fn try_from(datum: ImageDatum) -> Result<Self> {
        let url = datum.url.filter(|url| !url.trim().is_empty());
        match (url, datum.b64_json) {
            (Some(url), _) => Ok(ImagePayload::Url(url)),
            (None, Some(data)) => Ok(ImagePayload::Inline(data)),
            (None, None) => Err(ImageError::UnknownEncoding),
        }
    }
}

#[derive(Debug)]
pub struct StoredImage {
    pub bytes: Vec<u8>,
    pub path: PathBuf,
}

impl StoredImage {
    pub fn new(bytes: Vec<u8>, path: impl AsRef<Path>) -> Self {
        Self {
            bytes,
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Writes the bytes and returns the absolute path they landed at.
    pub fn persist(self) -> Result<PathBuf> {
        crate::storage::write_atomic(&self.path, &self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_size_parsing() {
        let size: ImageSize = "1792x1024".parse().unwrap();
        assert_eq!(size, ImageSize::new(1792, 1024).unwrap());
        assert_eq!(size.to_string(), "1792x1024");

        for bad in ["", "1024", "x1024", "1024x", "0x512", "-1x5", "10x10x10", "axb"] {
            assert!(
                matches!(bad.parse::<ImageSize>(), Err(ImageError::InvalidRequest(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerationRequest::new("gemini-3-pro-image", "a lighthouse")
            .with_count(NonZeroU32::new(2).unwrap())
            .with_size("512x512".parse().unwrap());

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "gemini-3-pro-image",
                "prompt": "a lighthouse",
                "n": 2,
                "size": "512x512"
            })
        );
    }

    #[test]
    fn test_payload_variants() {
        let response: GenerationResponse = serde_json::from_value(json!({
            "created": 1700000000,
            "data": [
                {"url": "https://cdn.example.com/a.png", "b64_json": "AAAA"},
                {"b64_json": "AAAA", "revised_prompt": "a lighthouse at dusk"},
                {}
            ]
        }))
        .unwrap();

        let mut data = response.data.into_iter();
        assert_eq!(
            ImagePayload::try_from(data.next().unwrap()).unwrap(),
            ImagePayload::Url("https://cdn.example.com/a.png".into())
        );
        assert_eq!(
            ImagePayload::try_from(data.next().unwrap()).unwrap(),
            ImagePayload::Inline("AAAA".into())
        );
        assert!(matches!(
            ImagePayload::try_from(data.next().unwrap()),
            Err(ImageError::UnknownEncoding)
        ));
    }

    #[test]
    fn test_blank_url_is_not_fetchable() {
        let datum = ImageDatum {
            url: Some("  ".into()),
            b64_json: Some("AAAA".into()),
            ..Default::default()
        };
        assert_eq!(
            ImagePayload::try_from(datum).unwrap(),
            ImagePayload::Inline("AAAA".into())
        );

        let datum = ImageDatum {
            url: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            ImagePayload::try_from(datum),
            Err(ImageError::UnknownEncoding)
        ));
    }

    #[test]
    fn test_missing_data_is_empty() {
        let response: GenerationResponse = serde_json::from_value(json!({"created": 1})).unwrap();
        assert!(response.data.is_empty());
    }
}
