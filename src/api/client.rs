//
//  tf-collect
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Client Wrapper for Bitbucket API
//!
//! This module provides the core HTTP client for the discovery backends.
//! It handles the API root per platform, authentication, and mapping of
//! non-success responses into [`ApiError`].
//!
//! ## Features
//!
//! - Authentication header injection
//! - Percent-encoded path segments
//! - Pagination links restricted to the API root's origin
//! - JSON deserialization
//! - Error bodies reduced to their human-readable message
//! - Custom User-Agent header

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::api::common::ApiError;
use crate::auth::AuthCredential;

/// Request timeout for a single API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Extracts a user-friendly message from a Bitbucket error body.
///
/// Bitbucket Cloud returns errors in the format:
/// ```json
/// {"type": "error", "error": {"message": "Human readable message"}}
/// ```
///
/// Bitbucket Server returns errors in the format:
/// ```json
/// {"errors": [{"message": "Human readable message"}]}
/// ```
///
/// If neither shape matches, the raw body is returned.
pub fn extract_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        // Cloud format: {"type": "error", "error": {"message": "..."}}
        if let Some(message) = json
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }

        // Server format: {"errors": [{"message": "..."}]}
        if let Some(message) = json
            .get("errors")
            .and_then(|e| e.as_array())
            .and_then(|arr| arr.first())
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }

        // Simple message format: {"message": "..."}
        if let Some(message) = json.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }

    body.trim().to_string()
}

/// Maps a non-success HTTP status and body to an [`ApiError`].
pub fn error_for_status(status: StatusCode, body: &str) -> ApiError {
    let message = extract_error_message(body);
    match status {
        StatusCode::UNAUTHORIZED => ApiError::AuthFailed(message),
        StatusCode::FORBIDDEN => ApiError::Forbidden(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
        s if s.is_server_error() => ApiError::ServerError(format!("{s}: {message}")),
        s => ApiError::Unknown(format!("{s}: {message}")),
    }
}

/// Represents the type of Bitbucket platform being accessed.
///
/// # Variants
///
/// * `Cloud` - Bitbucket Cloud, using API v2.0
/// * `Server` - Bitbucket Server/Data Center, using API v1.0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostType {
    /// Bitbucket Cloud (bitbucket.org)
    Cloud,

    /// Bitbucket Server/Data Center
    Server,
}

/// The HTTP client for the Bitbucket repository-listing APIs.
///
/// # Creating a Client
///
/// ```rust,ignore
/// use tf_collect::api::BitbucketClient;
/// use tf_collect::auth::AuthCredential;
///
/// let client = BitbucketClient::server("https://bitbucket.example.com/rest/api/1.0")?
///     .with_auth(AuthCredential::Basic {
///         username: "ci".into(),
///         password: "secret".into(),
///     });
/// ```
pub struct BitbucketClient {
    /// The underlying HTTP client
    http: Client,
    /// API root, without a trailing slash in its path
    api_root: Url,
    /// The platform type (Cloud or Server/DC)
    host_type: HostType,
    /// Optional authentication credentials
    auth: Option<AuthCredential>,
}

impl BitbucketClient {
    /// Creates a client targeting a Bitbucket Cloud API root
    /// (normally `https://api.bitbucket.org/2.0`).
    pub fn cloud(api_root: &str) -> Result<Self, ApiError> {
        Self::new(api_root, HostType::Cloud)
    }

    /// Creates a client targeting a Bitbucket Server/DC API root
    /// (`https://<host>/rest/api/1.0`).
    pub fn server(api_root: &str) -> Result<Self, ApiError> {
        Self::new(api_root, HostType::Server)
    }

    fn new(api_root: &str, host_type: HostType) -> Result<Self, ApiError> {
        let trimmed = api_root.trim_end_matches('/');
        let api_root = Url::parse(trimmed).map_err(|e| ApiError::InvalidUrl {
            url: trimmed.to_string(),
            reason: e.to_string(),
        })?;
        if api_root.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                url: trimmed.to_string(),
                reason: "not a hierarchical URL".to_string(),
            });
        }

        Ok(Self {
            http: Client::builder()
                .user_agent(format!("tfcollect/{}", crate::VERSION))
                .timeout(REQUEST_TIMEOUT)
                .build()?,
            api_root,
            host_type,
            auth: None,
        })
    }

    /// Sets the authentication credentials for this client.
    pub fn with_auth(mut self, auth: AuthCredential) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Builds the URL for `segments` under the API root. Each segment is
    /// percent-encoded, so a `/` or space in a project key stays inside
    /// its segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.api_root.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl {
                url: self.api_root.to_string(),
                reason: "not a hierarchical URL".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Makes an authenticated GET request to `segments` under the API root.
    ///
    /// # Parameters
    ///
    /// * `segments` - Path segments, e.g. `["projects", "INFRA", "repos"]`
    /// * `query` - Query string pairs
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The network request fails
    /// - The response status is not successful (2xx)
    /// - The response body cannot be deserialized to type `T`
    pub async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        self.fetch(url, query).await
    }

    /// Makes an authenticated GET request to an absolute URL, as returned in
    /// Cloud `next` pagination links.
    ///
    /// # Errors
    ///
    /// [`ApiError::ForeignLink`] when `url` does not share the API root's
    /// origin, before any request is sent.
    pub async fn get_url<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let target = Url::parse(url).map_err(|e| ApiError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if target.origin() != self.api_root.origin() {
            return Err(ApiError::ForeignLink(url.to_string()));
        }
        self.fetch(target, &[]).await
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        debug!(host = ?self.host_type, url = %url, ?query, "GET");
        let mut request = self.http.get(url.clone()).query(query);

        if let Some(auth) = &self.auth {
            request = auth.apply_to_request(request);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(host = ?self.host_type, url = %url, status = status.as_u16(), "response");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, &text));
        }

        response.json().await.map_err(ApiError::Decode)
    }
}
