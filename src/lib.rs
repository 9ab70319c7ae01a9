//! Request an image from an OpenAI-compatible generation endpoint and save it.
//!
//! ```no_run
//! use imgfetch::{ClientConfig, GenClient, GenerationRequest};
//!
//! # async fn example() -> imgfetch::Result<()> {
//! let config = ClientConfig::from_env();
//! let client = GenClient::new(&config)?;
//! let request = GenerationRequest::new(config.model_or_default(), "a lighthouse at dusk");
//! let path = client.image().generate_and_save(&request, "lighthouse.png").await?;
//! println!("MEDIA: {}", path.display());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod storage;

pub use client::{GenClient, ImageClient};
pub use config::ClientConfig;
pub use error::{ImageError, Result};
pub use models::{
    GenerationRequest, GenerationResponse, ImageDatum, ImagePayload, ImageSize, StoredImage,
};

/// Marker printed in front of the saved path on stdout.
pub const MEDIA_MARKER: &str = "MEDIA:";
