/// Remote image fetching
///
/// This module handles:
/// - HTTP GET of report images
/// - Bounding the downloaded body size
/// - Decoding the bytes into an image
///
/// The layout engine only sees the `ImageSource` trait, so tests can drive
/// it with canned images and failures.
use crate::config::ImagesConfig;
use image::DynamicImage;
use log::debug;
use std::io::Read;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("sheet-report/", env!("CARGO_PKG_VERSION"));

/// Why one image could not be placed
#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server answered HTTP {0}")]
    Status(u16),

    #[error("image larger than {0} bytes")]
    TooLarge(u64),

    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that can turn a URL into a decoded image
pub trait ImageSource {
    fn load(&mut self, url: &str) -> Result<DynamicImage, ImageLoadError>;
}

/// Blocking HTTP source backed by a ureq agent
pub struct HttpImageSource {
    agent: ureq::Agent,
    max_bytes: u64,
}

impl HttpImageSource {
    pub fn new(timeout: Option<Duration>, max_bytes: u64) -> Self {
        let mut builder = ureq::AgentBuilder::new().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self { agent: builder.build(), max_bytes }
    }

    pub fn from_config(images: &ImagesConfig) -> Self {
        Self::new(images.timeout_secs.map(Duration::from_secs), images.max_bytes)
    }

    /// Download the body of `url`, refusing anything over the size cap
    fn http_get_bytes(&self, url: &str) -> Result<Vec<u8>, ImageLoadError> {
        let resp = match self.agent.get(url).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, _)) => return Err(ImageLoadError::Status(code)),
            Err(e) => return Err(ImageLoadError::Transport(e.to_string())),
        };

        let len = resp.header("Content-Length").and_then(|s| s.parse::<u64>().ok()).unwrap_or(0);
        if len > self.max_bytes {
            return Err(ImageLoadError::TooLarge(self.max_bytes));
        }

        let mut data: Vec<u8> = Vec::with_capacity(len as usize);
        resp.into_reader().take(self.max_bytes + 1).read_to_end(&mut data)?;
        if data.len() as u64 > self.max_bytes {
            return Err(ImageLoadError::TooLarge(self.max_bytes));
        }
        Ok(data)
    }
}

impl ImageSource for HttpImageSource {
    fn load(&mut self, url: &str) -> Result<DynamicImage, ImageLoadError> {
        let bytes = self.http_get_bytes(url)?;
        debug!("fetched {} bytes from {}", bytes.len(), url);
        Ok(image::load_from_memory(&bytes)?)
    }
}
