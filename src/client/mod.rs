pub mod image_client;

use reqwest::Client;

use crate::{config::ClientConfig, error::Result};

pub use image_client::ImageClient;

/// Entry point: validates configuration and hands out the image client.
#[derive(Clone)]
pub struct GenClient {
    image_client: ImageClient,
}

impl GenClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_http_client(config, Client::new())
    }

    /// Use a custom `reqwest::Client` (proxies, TLS roots).
    pub fn with_http_client(config: &ClientConfig, http: Client) -> Result<Self> {
        let (endpoint, api_key) = config.credentials()?;

        log::debug!("Image endpoint: {}", endpoint);

        Ok(Self {
            image_client: ImageClient::new(http, endpoint, api_key),
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }
}
