use std::num::NonZeroU32;
use std::process::ExitCode;

use clap::Parser;
use imgfetch::logger::{self, LogLevel, LoggerConfig};
use imgfetch::{storage, ClientConfig, GenClient, GenerationRequest, ImageError, MEDIA_MARKER};

/// Generate one image through an OpenAI-compatible endpoint and save it.
///
/// Flags override the IMAGE_* environment variables (a `.env` file is read first).
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Text prompt describing the image
    prompt: String,

    /// Generation endpoint, e.g. http://127.0.0.1:8045/v1/images/generations
    #[arg(long)]
    endpoint: Option<String>,

    /// Bearer credential
    #[arg(long)]
    api_key: Option<String>,

    #[arg(short, long)]
    model: Option<String>,

    /// Image size as WIDTHxHEIGHT
    #[arg(short, long)]
    size: Option<String>,

    /// Number of images to request; only the first one is saved
    #[arg(short = 'n', long, default_value = "1")]
    count: NonZeroU32,

    /// Destination path; supports {model}, {timestamp} and {id}
    #[arg(short, long)]
    output: Option<String>,

    #[arg(long, env = "RUST_LOG_LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Emit log lines as JSON
    #[arg(long)]
    json_logs: bool,

    /// Disable colored log output
    #[arg(long)]
    no_color: bool,
}

impl Args {
    fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint);
        }
        if let Some(api_key) = &self.api_key {
            config = config.with_api_key(api_key);
        }
        if let Some(model) = &self.model {
            config = config.with_model(model);
        }
        if let Some(size) = &self.size {
            config = config.with_size(size);
        }
        if let Some(output) = &self.output {
            config = config.with_output(output);
        }
        config
    }

    fn logger_config(&self) -> LoggerConfig {
        let config = if self.json_logs {
            LoggerConfig::production()
        } else if self.log_level <= LogLevel::Debug {
            LoggerConfig::development().with_colors(!self.no_color)
        } else {
            LoggerConfig::new().with_colors(!self.no_color)
        };
        config.with_level(self.log_level)
    }
}

async fn run(args: &Args) -> imgfetch::Result<std::path::PathBuf> {
    let config = args.config();
    let client = GenClient::new(&config)?;

    let request = GenerationRequest::new(config.model_or_default(), args.prompt.as_str())
        .with_count(args.count)
        .with_size(config.size_or_default()?);
    let destination = storage::expand_template(config.output_or_default(), &request);

    let _timer = logger::timer("Image generation");
    client.image().generate_and_save(&request, destination).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let args = Args::parse();

    if let Err(e) = logger::init_with_config(args.logger_config()) {
        eprintln!("{}", e);
    }

    if dotenv_loaded {
        log::debug!(".env file loaded");
    }

    match run(&args).await {
        Ok(path) => {
            println!("{} {}", MEDIA_MARKER, path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            if let ImageError::Config(_) = e {
                log::warn!("Set IMAGE_API_URL and IMAGE_API_KEY, or pass --endpoint and --api-key");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_config_from_flags() {
        let args = Args::parse_from(["imgfetch", "a cat", "--log-level", "debug"]);
        let config = args.logger_config();
        assert_eq!(config.min_level, LogLevel::Debug);
        assert!(config.show_module);
        assert!(config.show_colors);

        let args = Args::parse_from(["imgfetch", "a cat", "--log-level", "warn", "--no-color"]);
        let config = args.logger_config();
        assert_eq!(config.min_level, LogLevel::Warn);
        assert!(!config.show_module);
        assert!(!config.show_colors);

        let args = Args::parse_from(["imgfetch", "a cat", "--json-logs", "--log-level", "error"]);
        let config = args.logger_config();
        assert!(config.output_json);
        assert_eq!(config.min_level, LogLevel::Error);
    }
}
