//! HTTP client for the gallery backend

use std::time::Duration;

use reqwest::{Response, Url};
use tracing::debug;

use super::error::{ApiError, Result};
use super::query::ImagesRequest;
use crate::state::data::ImageList;

/// Typed client for the image-index REST API.
///
/// Cheap to clone: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct GalleryClient {
    inner: reqwest::Client,
    base_url: Url,
}

impl GalleryClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8080/api/v1`).
    ///
    /// No timeout is applied unless one is given.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(format!("sd-gallery/{}", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// URL of the image binary; the whole id is a single path segment
    pub fn image_url(&self, id: &str) -> Url {
        self.endpoint(&["image", id])
    }

    /// `GET /images` with the given filters
    pub async fn list_images(&self, request: &ImagesRequest) -> Result<ImageList> {
        let url = self.endpoint(&["images"]);
        debug!("HTTP GET: {} {:?}", url, request);

        let response = self.inner.get(url).query(request).send().await?;
        let body = check_status(response).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// `GET /checkpoints`; a `null` body is treated as an empty list
    pub async fn list_checkpoints(&self) -> Result<Vec<String>> {
        let url = self.endpoint(&["checkpoints"]);
        debug!("HTTP GET: {}", url);

        let response = self.inner.get(url).send().await?;
        let body = check_status(response).await?.bytes().await?;
        let names: Option<Vec<String>> = serde_json::from_slice(&body)?;
        Ok(names.unwrap_or_default())
    }

    /// Download the raw bytes of one image
    pub async fn fetch_image(&self, id: &str) -> Result<Vec<u8>> {
        let url = self.image_url(id);
        debug!("HTTP GET: {}", url);

        let response = self.inner.get(url).send().await?;
        let body = check_status(response).await?.bytes().await?;
        Ok(body.to_vec())
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(ApiError::HttpStatus {
        status,
        message: response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string()),
    })
}
