//! `reqwest` implementation of the backend API.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ApiConfig, ApiError, AuthSession, FetchedImage, ImageSink, ImageSource};
use crate::metadata::ExifSummary;
use crate::session::SessionVersion;

/// Query parameter that keys image fetches to a session version.
const VERSION_PARAM: &str = "v";

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct Registration<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EditRequest<'a> {
    image_data: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// An image row as listed by the backend.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    #[serde(rename = "ID")]
    pub id: u64,
    pub filename: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub thumbnail_path: String,
    #[serde(default)]
    pub camera_make: Option<String>,
    #[serde(default)]
    pub camera_model: Option<String>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub taken_at: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl ImageRecord {
    /// The EXIF fields the backend extracted at upload time.
    pub fn exif(&self) -> ExifSummary {
        let non_empty = |s: &Option<String>| s.as_ref().filter(|v| !v.trim().is_empty()).cloned();
        ExifSummary {
            camera_make: non_empty(&self.camera_make),
            camera_model: non_empty(&self.camera_model),
            resolution: non_empty(&self.resolution),
            taken_at: non_empty(&self.taken_at),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Client for the backend's `/api/v1` routes.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    auth: AuthSession,
}

impl ApiClient {
    pub fn new(config: ApiConfig, auth: AuthSession) -> Self {
        Self {
            http: Client::new(),
            config,
            auth,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    /// URL of an image's binary content at a given session version.
    pub fn image_file_url(&self, image_id: u64, version: SessionVersion) -> String {
        format!(
            "{}?{VERSION_PARAM}={version}",
            self.config.endpoint(&format!("images/{image_id}/file"))
        )
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError> {
        let request = self
            .http
            .post(self.config.endpoint("users/register"))
            .timeout(self.config.timeout)
            .json(&Registration {
                username,
                email,
                password,
            });
        check(request.send().await?).await?;
        info!(username, "registered");
        Ok(())
    }

    /// Log in and keep the returned token for subsequent requests.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ApiError> {
        let request = self
            .http
            .post(self.config.endpoint("users/login"))
            .timeout(self.config.timeout)
            .json(&Credentials { email, password });
        let response = check(request.send().await?).await?;
        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        self.auth.set_token(body.token);
        info!("logged in");
        Ok(())
    }

    pub fn logout(&mut self) {
        if !self.auth.is_authenticated() {
            debug!("logout without a session");
            return;
        }
        self.auth.clear();
        info!("logged out");
    }

    /// Fetch the raw bytes of an image.
    pub async fn image_bytes(&self, image_id: u64, version: SessionVersion) -> Result<FetchedImage, ApiError> {
        let url = self.image_file_url(image_id, version);
        debug!(%url, "GET image file");
        let response = check(self.authorized(self.http.get(url)).send().await?).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(ApiError::UnexpectedContentType(content_type));
        }

        let bytes = response.bytes().await?.to_vec();
        Ok(FetchedImage { bytes, content_type })
    }

    /// Replace an image's content with an edited rendition.
    pub async fn save_edit(&self, image_id: u64, data_url: &str) -> Result<(), ApiError> {
        let request = self
            .http
            .put(self.config.endpoint(&format!("images/{image_id}/edit")))
            .json(&EditRequest { image_data: data_url });
        check(self.authorized(request).send().await?).await?;
        info!(image_id, "saved edited image");
        Ok(())
    }

    /// Fetch an image's metadata row.
    pub async fn image_record(&self, image_id: u64) -> Result<ImageRecord, ApiError> {
        let request = self.http.get(self.config.endpoint(&format!("images/{image_id}")));
        let response = check(self.authorized(request).send().await?).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.timeout(self.config.timeout);
        match self.auth.bearer() {
            Some(bearer) => request.header(AUTHORIZATION, bearer),
            None => request,
        }
    }
}

impl ImageSource for ApiClient {
    async fn fetch_image(&self, image_id: u64, version: SessionVersion) -> Result<FetchedImage, ApiError> {
        self.image_bytes(image_id, version).await
    }
}

impl ImageSink for ApiClient {
    async fn save_image(&self, image_id: u64, data_url: &str) -> Result<(), ApiError> {
        self.save_edit(image_id, data_url).await
    }
}

/// Turn an error status into [`ApiError::Server`] using the body's message.
async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_response(status.as_u16(), &body))
}
