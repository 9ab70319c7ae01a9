use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header, Client, Url};

use crate::{
    error::{ImageError, Result},
    models::{GenerationRequest, GenerationResponse, ImagePayload, StoredImage},
};

#[derive(Clone)]
pub struct ImageClient {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl ImageClient {
    pub fn new(http: Client, endpoint: Url, api_key: impl Into<String>) -> Self {
        Self {
            http,
            endpoint,
            api_key: api_key.into(),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Submits the generation request and returns the parsed result list.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        log::info!(
            "Generating {} image(s) at {} with model: {}",
            request.n,
            request.size,
            request.model
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|source| ImageError::Transport {
                context: format!("Cannot reach image endpoint {}", self.endpoint),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| ImageError::Transport {
            context: "Failed to read generation response".to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(ImageError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        log::debug!("Generation response: {}", body);

        let parsed: GenerationResponse = serde_json::from_str(&body)
            .map_err(|e| ImageError::MalformedResponse(format!("{e}: {body}")))?;

        if parsed.data.is_empty() {
            return Err(ImageError::MalformedResponse(format!(
                "no images in response: {body}"
            )));
        }

        Ok(parsed)
    }

    /// Turns one result into raw image bytes.
    pub async fn retrieve(&self, payload: ImagePayload) -> Result<Vec<u8>> {
        match payload {
            ImagePayload::Url(url) => self.download(&url).await,
            ImagePayload::Inline(data) => {
                let bytes = STANDARD.decode(data.trim())?;
                log::debug!("Decoded {} bytes of inline image data", bytes.len());
                Ok(bytes)
            }
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let fetch_failed = |reason: String| ImageError::FetchFailed {
            url: url.to_string(),
            reason,
        };

        let target = self
            .endpoint
            .join(url)
            .map_err(|e| fetch_failed(e.to_string()))?;

        log::info!("Downloading image from {}", target);

        let response = self
            .http
            .get(target)
            .send()
            .await
            .map_err(|e| fetch_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_failed(format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_failed(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    /// Generates one image and writes it to `destination`.
    ///
    /// Only the first result is used. Nothing is written unless the bytes were
    /// obtained in full.
    pub async fn generate_and_save(
        &self,
        request: &GenerationRequest,
        destination: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let response = self.generate(request).await?;

        let mut data = response.data.into_iter();
        let first = data
            .next()
            .ok_or_else(|| ImageError::MalformedResponse("no images in response".into()))?;
        let ignored = data.count();
        if ignored > 0 {
            log::debug!("Ignoring {} additional result(s)", ignored);
        }
        if let Some(revised) = &first.revised_prompt {
            log::info!("Revised prompt: {}", revised);
        }

        let payload = ImagePayload::try_from(first)?;
        let bytes = self.retrieve(payload).await?;

        let path = StoredImage::new(bytes, destination).persist()?;
        log::info!("Image saved to: {}", path.display());
        Ok(path)
    }
}
