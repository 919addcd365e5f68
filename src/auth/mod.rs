//
//  tf-collect
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! Credentials for the discovery backends and the rule deciding where their
//! secrets come from.
//!
//! ## Secret Precedence
//!
//! A secret may be written in the configuration file or supplied through an
//! environment variable. When both are present the environment variable wins,
//! so secrets can be kept out of the file entirely:
//!
//! | Config value | Env var | Result |
//! |--------------|---------|--------|
//! | set | set | env var |
//! | set | unset/empty | config value |
//! | unset | set | env var |
//! | unset | unset/empty | `None` |
//!
//! ## Example
//!
//! ```rust
//! use tf_collect::auth::resolve_secret_with;
//!
//! let secret = resolve_secret_with(Some("from-file"), "MY_SECRET", |_| Some("from-env".to_string()));
//! assert_eq!(secret.as_deref(), Some("from-env"));
//! ```

use reqwest::RequestBuilder;

/// Authentication credentials for a discovery backend.
///
/// # Variants
///
/// - `AppPassword`: Bitbucket Cloud username + app password.
/// - `Basic`: Bitbucket Server username + password (or HTTP access token).
///
/// Both are sent as HTTP Basic authentication.
#[derive(Clone)]
pub enum AuthCredential {
    /// App password authentication for Bitbucket Cloud.
    AppPassword {
        /// The Bitbucket username.
        username: String,
        /// The app password generated from Bitbucket settings.
        password: String,
    },
    /// Basic HTTP authentication for Bitbucket Server/Data Center.
    Basic {
        /// The username for authentication.
        username: String,
        /// The password for authentication.
        password: String,
    },
}

impl AuthCredential {
    /// Applies the credential to an HTTP request.
    ///
    /// # Parameters
    ///
    /// - `request`: The [`RequestBuilder`] to add authentication headers to.
    ///
    /// # Returns
    ///
    /// The request with an `Authorization: Basic ...` header.
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::AppPassword { username, password } | Self::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
        }
    }

    /// The account name carried by the credential.
    pub fn username(&self) -> &str {
        match self {
            Self::AppPassword { username, .. } | Self::Basic { username, .. } => username,
        }
    }
}

impl std::fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::AppPassword { .. } => "AppPassword",
            Self::Basic { .. } => "Basic",
        };
        f.debug_struct(kind)
            .field("username", &self.username())
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Resolves a secret from the process environment, falling back to the
/// configured value.
///
/// # Parameters
///
/// * `config_value` - The value from the configuration file, if any
/// * `env_var` - Name of the overriding environment variable
///
/// # Returns
///
/// The environment variable's value when it is set and non-empty, otherwise
/// the non-empty config value, otherwise `None`.
pub fn resolve_secret(config_value: Option<&str>, env_var: &str) -> Option<String> {
    resolve_secret_with(config_value, env_var, |name| std::env::var(name).ok())
}

/// [`resolve_secret`] with an injectable environment lookup.
pub fn resolve_secret_with<F>(config_value: Option<&str>, env_var: &str, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(env_var)
        .filter(|v| !v.is_empty())
        .or_else(|| config_value.filter(|v| !v.is_empty()).map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(value: Option<&'static str>) -> impl Fn(&str) -> Option<String> {
        move |_| value.map(str::to_string)
    }

    #[test]
    fn test_env_takes_precedence() {
        let secret = resolve_secret_with(Some("file"), "X", env_with(Some("env")));
        assert_eq!(secret.as_deref(), Some("env"));
    }

    #[test]
    fn test_falls_back_to_config() {
        assert_eq!(
            resolve_secret_with(Some("file"), "X", env_with(None)).as_deref(),
            Some("file")
        );
        assert_eq!(
            resolve_secret_with(Some("file"), "X", env_with(Some(""))).as_deref(),
            Some("file")
        );
    }

    #[test]
    fn test_missing_everywhere() {
        assert_eq!(resolve_secret_with(None, "X", env_with(None)), None);
        assert_eq!(resolve_secret_with(Some(""), "X", env_with(None)), None);
    }

    #[test]
    fn test_lookup_receives_variable_name() {
        let secret = resolve_secret_with(None, "BITBUCKET_SERVER_PASSWORD", |name| {
            (name == "BITBUCKET_SERVER_PASSWORD").then(|| "ok".to_string())
        });
        assert_eq!(secret.as_deref(), Some("ok"));
    }

    #[test]
    fn test_process_environment_fallback() {
        let secret = resolve_secret(Some("file"), "TF_COLLECT_TEST_UNSET_SECRET");
        assert_eq!(secret.as_deref(), Some("file"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let cred = AuthCredential::Basic {
            username: "ci".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{cred:?}");
        assert!(rendered.contains("ci"));
        assert!(!rendered.contains("hunter2"));
    }
}
