//! Client configuration.
//!
//! Configuration comes from code (`ClientConfig { .. }`) or from
//! `BIRDBUDDY_*` environment variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `BIRDBUDDY_URL` | `url` |
//! | `BIRDBUDDY_EMAIL` | `email` |
//! | `BIRDBUDDY_PASSWORD` | `password` |
//! | `BIRDBUDDY_REFRESH_TOKEN` | `refresh_token` |
//! | `BIRDBUDDY_ACCESS_TOKEN` | `access_token` |
//! | `BIRDBUDDY_LANGUAGE` | `language_code` |
//! | `BIRDBUDDY_TIMEOUT` | `timeout_seconds` |

use std::env;
use std::fmt;

use thiserror::Error;

use birdbuddy_core::defaults;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Missing credentials: set an email and password or a refresh token")]
    MissingCredentials,

    #[error("Email and password must be set together")]
    IncompleteLogin,
}

impl From<ConfigError> for birdbuddy_core::Error {
    fn from(e: ConfigError) -> Self {
        birdbuddy_core::Error::Config(e.to_string())
    }
}

/// Connection and credential settings for [`crate::BirdBuddy`].
#[derive(Clone)]
pub struct ClientConfig {
    /// GraphQL endpoint.
    pub url: String,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Saved refresh token, to resume a session without a password.
    pub refresh_token: Option<String>,
    /// Saved access token.
    pub access_token: Option<String>,
    /// `Accept-Language` value.
    pub language_code: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: defaults::GRAPHQL_URL.to_string(),
            email: None,
            password: None,
            refresh_token: None,
            access_token: None,
            language_code: defaults::LANGUAGE_CODE.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |set: bool| if set { Some("**REDACTED**") } else { None };
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("email", &self.email)
            .field("password", &redact(self.password.is_some()))
            .field("refresh_token", &redact(self.refresh_token.is_some()))
            .field("access_token", &redact(self.access_token.is_some()))
            .field("language_code", &self.language_code)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl ClientConfig {
    /// Log in with email and password.
    pub fn with_login(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    /// Resume a saved session.
    pub fn with_tokens(refresh_token: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            refresh_token: Some(refresh_token.into()),
            access_token,
            ..Self::default()
        }
    }

    /// Load from `BIRDBUDDY_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let non_empty = |key: &str| env::var(key).ok().filter(|v| !v.trim().is_empty());

        let timeout_seconds = match non_empty("BIRDBUDDY_TIMEOUT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?,
            None => defaults::REQUEST_TIMEOUT_SECS,
        };

        let config = Self {
            url: non_empty("BIRDBUDDY_URL").unwrap_or_else(|| defaults::GRAPHQL_URL.to_string()),
            email: non_empty("BIRDBUDDY_EMAIL"),
            password: non_empty("BIRDBUDDY_PASSWORD"),
            refresh_token: non_empty("BIRDBUDDY_REFRESH_TOKEN"),
            access_token: non_empty("BIRDBUDDY_ACCESS_TOKEN"),
            language_code: non_empty("BIRDBUDDY_LANGUAGE")
                .map(|tag| normalize_language_tag(&tag))
                .unwrap_or_else(|| defaults::LANGUAGE_CODE.to_string()),
            timeout_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(self.url.clone()));
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::InvalidTimeout("0".to_string()));
        }
        match (&self.email, &self.password) {
            (Some(_), None) | (None, Some(_)) => return Err(ConfigError::IncompleteLogin),
            (None, None) if self.refresh_token.is_none() => {
                return Err(ConfigError::MissingCredentials)
            }
            _ => {}
        }
        Ok(())
    }
}

/// Normalize a language tag to BCP-47 casing, e.g. `en_us` to `en-US`.
///
/// The primary language is lowercased, four-letter scripts are titlecased,
/// and two-letter or three-digit regions are uppercased.
pub fn normalize_language_tag(tag: &str) -> String {
    let tag = tag.trim();
    if tag.is_empty() {
        return defaults::LANGUAGE_CODE.to_string();
    }
    tag.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .enumerate()
        .map(|(i, part)| {
            if i == 0 {
                part.to_ascii_lowercase()
            } else if part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                let mut chars = part.chars();
                let first = chars.next().map(|c| c.to_ascii_uppercase());
                first
                    .into_iter()
                    .chain(chars.map(|c| c.to_ascii_lowercase()))
                    .collect()
            } else if (part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
                || (part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()))
            {
                part.to_ascii_uppercase()
            } else {
                part.to_ascii_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.url, defaults::GRAPHQL_URL);
        assert_eq!(config.language_code, "en");
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_validate_credentials() {
        assert_eq!(
            ClientConfig::default().validate(),
            Err(ConfigError::MissingCredentials)
        );
        assert!(ClientConfig::with_login("me@example.com", "pw").validate().is_ok());
        assert!(ClientConfig::with_tokens("refresh", None).validate().is_ok());

        let half = ClientConfig {
            email: Some("me@example.com".to_string()),
            ..ClientConfig::default()
        };
        assert_eq!(half.validate(), Err(ConfigError::IncompleteLogin));
    }

    #[test]
    fn test_validate_url() {
        let config = ClientConfig {
            url: "ftp://example.com".to_string(),
            ..ClientConfig::with_login("a", "b")
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ClientConfig::with_login("me@example.com", "hunter2");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("**REDACTED**"));
    }

    #[test]
    fn test_normalize_language_tag() {
        assert_eq!(normalize_language_tag("en"), "en");
        assert_eq!(normalize_language_tag("EN_us"), "en-US");
        assert_eq!(normalize_language_tag("zh-hant-tw"), "zh-Hant-TW");
        assert_eq!(normalize_language_tag("es-419"), "es-419");
        assert_eq!(normalize_language_tag(""), "en");
    }

    #[test]
    fn test_config_error_converts() {
        let err: birdbuddy_core::Error = ConfigError::MissingCredentials.into();
        assert!(matches!(err, birdbuddy_core::Error::Config(_)));
    }
}
