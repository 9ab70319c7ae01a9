use std::env;

use crate::error::{ImageError, Result};
use crate::models::ImageSize;

pub const DEFAULT_MODEL: &str = "gemini-3-pro-image";
pub const DEFAULT_OUTPUT: &str = "generated_{model}_{timestamp}.png";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub size: Option<String>,
    pub output: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            endpoint: None,
            api_key: None,
            model: None,
            size: None,
            output: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let endpoint = non_empty_var("IMAGE_API_URL");
        let api_key = non_empty_var("IMAGE_API_KEY");
        let model = non_empty_var("IMAGE_MODEL");
        let size = non_empty_var("IMAGE_SIZE");
        let output = non_empty_var("IMAGE_OUTPUT");

        ClientConfig {
            endpoint,
            api_key,
            model,
            size,
            output,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Endpoint and key are mandatory; there is no built-in fallback for either.
    pub fn credentials(&self) -> Result<(reqwest::Url, &str)> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| ImageError::Config("IMAGE_API_URL is required".into()))?;
        let endpoint = reqwest::Url::parse(endpoint)
            .map_err(|e| ImageError::Config(format!("invalid endpoint {endpoint}: {e}")))?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ImageError::Config("IMAGE_API_KEY is required".into()))?;

        Ok((endpoint, api_key))
    }

    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn size_or_default(&self) -> Result<ImageSize> {
        match self.size.as_deref() {
            Some(size) => size.parse(),
            None => Ok(ImageSize::default()),
        }
    }

    pub fn output_or_default(&self) -> &str {
        self.output.as_deref().unwrap_or(DEFAULT_OUTPUT)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new();
        assert_eq!(config.model_or_default(), DEFAULT_MODEL);
        assert_eq!(config.output_or_default(), DEFAULT_OUTPUT);
        assert_eq!(config.size_or_default().unwrap(), ImageSize::default());
    }

    #[test]
    fn test_missing_credentials() {
        let err = ClientConfig::new()
            .with_endpoint("http://127.0.0.1:8045/v1/images/generations")
            .credentials()
            .unwrap_err();
        assert!(matches!(err, ImageError::Config(msg) if msg.contains("IMAGE_API_KEY")));

        let err = ClientConfig::new().with_api_key("sk-test").credentials().unwrap_err();
        assert!(matches!(err, ImageError::Config(msg) if msg.contains("IMAGE_API_URL")));
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = ClientConfig::new()
            .with_endpoint("not a url")
            .with_api_key("sk-test");
        assert!(matches!(config.credentials(), Err(ImageError::Config(_))));
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::new()
            .with_endpoint("http://localhost:8045/v1/images/generations")
            .with_api_key("sk-test")
            .with_model("dall-e-3")
            .with_size("512x768")
            .with_output("out.png");

        let (endpoint, key) = config.credentials().unwrap();
        assert_eq!(endpoint.path(), "/v1/images/generations");
        assert_eq!(key, "sk-test");
        assert_eq!(config.model_or_default(), "dall-e-3");
        assert_eq!(config.size_or_default().unwrap().to_string(), "512x768");
        assert_eq!(config.output_or_default(), "out.png");
    }
}
