use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback box size when the detection service omits width or height
pub const DEFAULT_BOX_SIZE: f64 = 50.0;

/// Path of the detection listing, relative to the service base URL
pub const DETECTIONS_PATH: &str = "/api/detections";

fn default_box_size() -> f64 {
    DEFAULT_BOX_SIZE
}

/// One cube detected by the vision service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub id: String,
    pub color: String,
    /// Percent
    pub confidence: f64,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_box_size")]
    pub width: f64,
    #[serde(default = "default_box_size")]
    pub height: f64,
    /// Wall-clock time of the frame, as reported by the service
    pub timestamp: String,
}

/// Errors raised while fetching detections
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Detection service answered HTTP {0}")]
    Status(u16),

    #[error("Malformed detection payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Anything that can produce the current detection list
pub trait DetectionSource {
    fn fetch(&mut self) -> Result<Vec<Detection>, DetectionError>;
}

impl<S: DetectionSource + ?Sized> DetectionSource for Box<S> {
    fn fetch(&mut self) -> Result<Vec<Detection>, DetectionError> {
        (**self).fetch()
    }
}

/// Detection source backed by the vision service's HTTP endpoint
pub struct HttpDetectionSource {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpDetectionSource {
    /// Create a source polling `{base_url}/api/detections`
    pub fn new(base_url: &str) -> Result<Self, DetectionError> {
        let client = reqwest::blocking::Client::builder().no_proxy().build()?;
        Ok(Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), DETECTIONS_PATH),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl DetectionSource for HttpDetectionSource {
    fn fetch(&mut self) -> Result<Vec<Detection>, DetectionError> {
        let response = self.client.get(&self.url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(DetectionError::Status(status.as_u16()));
        }
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}
