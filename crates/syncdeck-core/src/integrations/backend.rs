//! HTTP client for the integrations backend.
//!
//! The backend exposes three routes per integration:
//!
//! ```text
//! POST /integrations/{slug}/authorize    form: user_id, org_id   -> authorization URL
//! POST /integrations/{slug}/credentials  form: user_id, org_id   -> credential bag
//! POST /integrations/{slug}/load         multipart: credentials  -> [NormalizedRecord]
//! ```
//!
//! Failures carry a JSON body `{"detail": "..."}` whose text is what the
//! operator gets to see.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, info};
use url::Url;

use super::credentials::CredentialBag;
use super::kind::IntegrationKind;
use super::traits::{Operator, RecordLoader};
use crate::error::{AuthError, ConfigError, LoadError};
use crate::records::NormalizedRecord;
use crate::storage::config::BackendConfig;

#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    /// Build a client for `base_url`, with `timeout` applied to every request.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute http(s) URL or the
    /// HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let mut url = Url::parse(base_url).map_err(|e| ConfigError::InvalidValue {
            key: "backend.base_url".into(),
            message: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                key: "backend.base_url".into(),
                message: format!("'{base_url}' cannot be used as a base URL"),
            });
        }
        // Url::join replaces the last segment unless the path ends with '/'.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "backend.timeout_secs".into(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: url,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, ConfigError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of `/integrations/{slug}/{action}`.
    pub fn endpoint(&self, kind: IntegrationKind, action: &str) -> Url {
        let relative = format!("integrations/{}/{action}", kind.slug());
        // The base always ends with '/', and the relative part is plain ASCII.
        self.base_url
            .join(&relative)
            .unwrap_or_else(|_| self.base_url.clone())
    }

    /// Fetch normalized records for `kind` using `credentials`.
    pub async fn load_records(
        &self,
        kind: IntegrationKind,
        credentials: &CredentialBag,
    ) -> Result<Vec<NormalizedRecord>, LoadError> {
        let form = reqwest::multipart::Form::new().text("credentials", credentials.to_form_value()?);
        let url = self.endpoint(kind, "load");
        info!(integration = %kind, %url, "loading records");

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(LoadError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(LoadError::Transport)?;
        if !status.is_success() {
            return Err(LoadError::Rejected {
                status: status.as_u16(),
                detail: error_detail(status, &body),
            });
        }

        let records: Vec<NormalizedRecord> =
            serde_json::from_str(&body).map_err(|e| LoadError::Decode(e.to_string()))?;
        info!(integration = %kind, count = records.len(), "records loaded");
        Ok(records)
    }

    /// Ask the backend for the provider authorization URL.
    pub async fn authorization_url(
        &self,
        kind: IntegrationKind,
        operator: &Operator,
    ) -> Result<String, AuthError> {
        let response = self
            .client
            .post(self.endpoint(kind, "authorize"))
            .form(&operator_form(operator))
            .send()
            .await
            .map_err(AuthError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(AuthError::Transport)?;
        if !status.is_success() {
            return Err(AuthError::Rejected {
                service: kind.display_name().to_string(),
                detail: error_detail(status, &body),
            });
        }

        // The backend answers with a JSON string; tolerate a bare URL too.
        let url = match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(serde_json::Value::String(url)) => url,
            _ => body.trim().to_string(),
        };
        Ok(url)
    }

    /// Collect the credentials stored by the provider callback.
    ///
    /// Returns `Ok(None)` while the operator has not finished authorizing,
    /// which the backend signals with `400 Bad Request`.
    pub async fn fetch_credentials(
        &self,
        kind: IntegrationKind,
        operator: &Operator,
    ) -> Result<Option<CredentialBag>, AuthError> {
        let response = self
            .client
            .post(self.endpoint(kind, "credentials"))
            .form(&operator_form(operator))
            .send()
            .await
            .map_err(AuthError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(AuthError::Transport)?;
        if status == StatusCode::BAD_REQUEST {
            debug!(integration = %kind, detail = %error_detail(status, &body), "credentials not ready");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AuthError::Rejected {
                service: kind.display_name().to_string(),
                detail: error_detail(status, &body),
            });
        }

        CredentialBag::from_json(&body).map(Some)
    }
}

impl RecordLoader for BackendClient {
    async fn load(
        &self,
        kind: IntegrationKind,
        credentials: &CredentialBag,
    ) -> Result<Vec<NormalizedRecord>, LoadError> {
        self.load_records(kind, credentials).await
    }
}

fn operator_form(operator: &Operator) -> [(&'static str, &str); 2] {
    [("user_id", operator.user.as_str()), ("org_id", operator.org.as_str())]
}

/// Extract the human-readable `detail` from an error body.
pub(crate) fn error_detail(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned());
    match detail {
        Some(serde_json::Value::String(text)) => text,
        Some(serde_json::Value::Null) | None => format!("HTTP {status}"),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn endpoint_composes_slug_and_action() {
        let backend = client("http://localhost:8000");
        assert_eq!(
            backend.endpoint(IntegrationKind::HubSpot, "load").as_str(),
            "http://localhost:8000/integrations/hubspot/load"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let backend = client("https://example.com/api");
        assert_eq!(
            backend.endpoint(IntegrationKind::Notion, "authorize").as_str(),
            "https://example.com/api/integrations/notion/authorize"
        );
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let backend = client("https://example.com/api");
        assert_eq!(backend.base_url().as_str(), "https://example.com/api/");
    }

    #[test]
    fn rejects_relative_base_url() {
        let err = BackendClient::new("localhost", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn error_detail_prefers_detail_string() {
        let detail = error_detail(StatusCode::BAD_REQUEST, r#"{"detail":"invalid token"}"#);
        assert_eq!(detail, "invalid token");
    }

    #[test]
    fn error_detail_falls_back_to_status() {
        let detail = error_detail(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(detail, "HTTP 502 Bad Gateway");
    }

    #[test]
    fn error_detail_stringifies_structured_detail() {
        let detail = error_detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":[{"msg":"field required"}]}"#,
        );
        assert!(detail.contains("field required"));
    }
}
