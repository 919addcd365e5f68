//
//  tf-collect
//  config/bitbucket.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Discovery Backend Configuration
//!
//! The `bitbucket` section describes where repositories are discovered.
//! Both backends are optional and may be combined.
//!
//! | Feature | Cloud | Server/DC |
//! |---------|-------|-----------|
//! | Container | Workspace slug | Project key |
//! | API Base | `api.bitbucket.org/2.0` | `<url>/rest/api/1.0` |
//! | Secret field | `app_password` | `password` |
//! | Secret env override | `BITBUCKET_CLOUD_APP_PASSWORD` | `BITBUCKET_SERVER_PASSWORD` |

use serde::Deserialize;
use url::Url;

use super::ConfigError;

/// Default API root for Bitbucket Cloud.
pub const DEFAULT_CLOUD_API_URL: &str = "https://api.bitbucket.org/2.0";

/// Environment variable overriding `bitbucket.server.password`.
pub const SERVER_PASSWORD_ENV: &str = "BITBUCKET_SERVER_PASSWORD";

/// Environment variable overriding `bitbucket.cloud.app_password`.
pub const CLOUD_APP_PASSWORD_ENV: &str = "BITBUCKET_CLOUD_APP_PASSWORD";

/// The `bitbucket` configuration section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BitbucketConfig {
    /// Bitbucket Server/Data Center backend.
    #[serde(default)]
    pub server: Option<ServerConfig>,

    /// Bitbucket Cloud backend.
    #[serde(default)]
    pub cloud: Option<CloudConfig>,
}

/// Bitbucket Server/Data Center backend.
///
/// # Fields
///
/// * `url` - Web root of the instance, e.g. `https://bitbucket.example.com`
/// * `username` - Account used for HTTP Basic authentication
/// * `password` - Password or HTTP access token; [`SERVER_PASSWORD_ENV`] wins when set
/// * `projects` - Project keys to enumerate, each with a name pattern
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub url: String,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub projects: Vec<FilterConfig>,
}

impl ServerConfig {
    /// Ensures `url` is an absolute http(s) URL.
    pub(crate) fn validate_url(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidServerUrl {
            url: self.url.clone(),
            reason,
        };

        let parsed = Url::parse(&self.url).map_err(|e| invalid(e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(invalid(format!("unsupported scheme '{other}'"))),
        }
    }

    /// REST API root, e.g. `https://bitbucket.example.com/rest/api/1.0`.
    pub fn api_root(&self) -> String {
        format!("{}/rest/api/1.0", self.url.trim_end_matches('/'))
    }
}

/// Bitbucket Cloud backend.
///
/// # Fields
///
/// * `username` - Atlassian username for app-password authentication
/// * `app_password` - App password; [`CLOUD_APP_PASSWORD_ENV`] wins when set
/// * `workspaces` - Workspace slugs to enumerate, each with a name pattern
/// * `api_url` - API root, defaults to [`DEFAULT_CLOUD_API_URL`]
#[derive(Debug, Clone, Deserialize)]
pub struct CloudConfig {
    pub username: String,
    #[serde(default)]
    pub app_password: Option<String>,
    #[serde(default)]
    pub workspaces: Vec<FilterConfig>,
    #[serde(default = "default_cloud_api_url")]
    pub api_url: String,
}

fn default_cloud_api_url() -> String {
    DEFAULT_CLOUD_API_URL.to_string()
}

/// One project or workspace entry: the container to list and the pattern a
/// repository's short name must match.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Project key (Server) or workspace slug (Cloud).
    pub name: String,

    /// Regular expression matched against the whole repository name.
    /// A missing pattern is treated as empty and matches nothing.
    #[serde(default)]
    pub repo_pattern: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(url: &str) -> ServerConfig {
        ServerConfig {
            url: url.to_string(),
            username: "ci".to_string(),
            password: None,
            projects: Vec::new(),
        }
    }

    #[test]
    fn test_api_root_strips_trailing_slash() {
        assert_eq!(
            server("https://bb.example.com/").api_root(),
            "https://bb.example.com/rest/api/1.0"
        );
        assert_eq!(
            server("https://example.com/bitbucket").api_root(),
            "https://example.com/bitbucket/rest/api/1.0"
        );
    }

    #[test]
    fn test_validate_url_scheme() {
        assert!(server("http://localhost:7990").validate_url().is_ok());
        assert!(server("ftp://bb.example.com").validate_url().is_err());
        assert!(server("not a url").validate_url().is_err());
    }
}
