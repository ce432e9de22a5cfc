//! Face++ HTTP client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::config::FacePlusPlusConfig;
use crate::error::{FppError, FppResult};
use crate::metrics::record_request;
use crate::types::DetectResponse;

/// Attribute selector sent with every detect request.
pub const RETURN_ATTRIBUTES: &str = "emotion";

/// Anything that can classify the faces on an image.
///
/// [`FacePlusPlusClient`] is the production implementation; tests plug in
/// stubs.
#[async_trait]
pub trait FaceAnalyzer: Send + Sync {
    /// Detect faces and their emotion attributes on the image at `image_url`.
    async fn detect(&self, image_url: &str) -> FppResult<DetectResponse>;
}

/// HTTP session against the Face++ detect endpoint.
///
/// Owns its own connection pool; dropping the client closes its connections.
pub struct FacePlusPlusClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    api_secret: String,
}

impl FacePlusPlusClient {
    /// Open a new session.
    pub fn open(config: &FacePlusPlusConfig) -> FppResult<Self> {
        let endpoint = Url::parse(&config.api_url)?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("emofilter-facepp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FppError::Network)?;

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// Build the detect URL for one image.
    ///
    /// All parameters travel in the query string.
    pub fn detect_url(&self, image_url: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("api_secret", &self.api_secret)
            .append_pair("return_attributes", RETURN_ATTRIBUTES)
            .append_pair("image_url", image_url);
        url
    }

    async fn handle_error_response(status: u16, response: reqwest::Response) -> FppError {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<DetectResponse>(&body)
            .ok()
            .and_then(|r| r.error_message)
            .unwrap_or(body);

        warn!(status, error = %message, "Face++ detect request failed");
        FppError::from_http_status(status, message)
    }
}

#[async_trait]
impl FaceAnalyzer for FacePlusPlusClient {
    async fn detect(&self, image_url: &str) -> FppResult<DetectResponse> {
        let url = self.detect_url(image_url);
        let start = Instant::now();

        debug!(image_url, "Sending Face++ detect request");

        let response = match self.http.post(url).send().await {
            Ok(response) => response,
            Err(e) => {
                record_request(0, start.elapsed().as_secs_f64() * 1000.0);
                return Err(FppError::Network(e));
            }
        };

        let status = response.status();
        record_request(status.as_u16(), start.elapsed().as_secs_f64() * 1000.0);

        if !status.is_success() {
            return Err(Self::handle_error_response(status.as_u16(), response).await);
        }

        let body = response.bytes().await?;
        let detect: DetectResponse = serde_json::from_slice(&body)?;

        debug!(
            image_url,
            faces = detect.faces().len(),
            request_id = detect.request_id.as_deref().unwrap_or(""),
            "Face++ detect completed"
        );

        Ok(detect)
    }
}
