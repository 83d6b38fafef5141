//! IBM Cloud IAM authenticator
//!
//! Exchanges the API key for a bearer token and caches it until shortly before
//! it expires.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};

const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Tokens are refreshed this long before IAM says they expire
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// IAM token provider shared by the OpenScale and governance clients
#[derive(Clone)]
pub struct IamAuthenticator {
    http_client: Client,
    token_url: String,
    api_key: String,
    cached: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.refresh_at
    }
}

/// IAM token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

impl IamAuthenticator {
    pub fn new(http_client: Client, token_url: String, api_key: String) -> Self {
        Self {
            http_client,
            token_url,
            api_key,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Current bearer token, requesting a new one when the cache is stale
    pub async fn bearer_token(&self) -> AppResult<String> {
        if let Some(token) = self.cached.read().await.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.access_token.clone());
        }

        let mut cached = self.cached.write().await;
        // another request may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.access_token.clone());
        }

        let response = self.request_token().await?;
        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(REFRESH_MARGIN);
        tracing::debug!("IAM token refreshed, valid for {:?}", lifetime);

        let token = CachedToken {
            access_token: response.access_token,
            refresh_at: Instant::now() + lifetime,
        };
        let access_token = token.access_token.clone();
        *cached = Some(token);

        Ok(access_token)
    }

    async fn request_token(&self) -> AppResult<TokenResponse> {
        let response = self
            .http_client
            .post(&self.token_url)
            .header("Accept", "application/json")
            .form(&[("grant_type", APIKEY_GRANT_TYPE), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Authentication(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Authentication(format!(
                "IAM returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Authentication(format!("Failed to parse response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use axum::{extract::State, http::StatusCode, routing::post, Form, Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::external::test_server;

    struct TokenEndpoint {
        issued: AtomicUsize,
        expires_in: u64,
    }

    async fn issue_token(
        State(endpoint): State<Arc<TokenEndpoint>>,
        Form(form): Form<HashMap<String, String>>,
    ) -> (StatusCode, Json<Value>) {
        if form.get("grant_type").map(String::as_str) != Some(APIKEY_GRANT_TYPE)
            || form.get("apikey").map(String::as_str) != Some("key")
        {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "errorMessage": "Provided API key could not be found." })),
            );
        }

        let n = endpoint.issued.fetch_add(1, Ordering::SeqCst) + 1;
        (
            StatusCode::OK,
            Json(json!({
                "access_token": format!("tok-{}", n),
                "expires_in": endpoint.expires_in
            })),
        )
    }

    /// IAM token endpoint handing out `tok-1`, `tok-2`, ...
    async fn token_endpoint(expires_in: u64) -> (String, Arc<TokenEndpoint>) {
        let endpoint = Arc::new(TokenEndpoint {
            issued: AtomicUsize::new(0),
            expires_in,
        });
        let app = Router::new()
            .route("/identity/token", post(issue_token))
            .with_state(endpoint.clone());
        let base = test_server::spawn(app).await;
        (format!("{}/identity/token", base), endpoint)
    }

    #[test]
    fn test_token_freshness() {
        let fresh = CachedToken {
            access_token: "a".into(),
            refresh_at: Instant::now() + Duration::from_secs(30),
        };
        assert!(fresh.is_fresh());

        let stale = CachedToken {
            access_token: "b".into(),
            refresh_at: Instant::now(),
        };
        assert!(!stale.is_fresh());
    }

    #[test]
    fn test_token_response_parsing() {
        let parsed: TokenResponse = serde_json::from_str(
            r#"{"access_token":"tok","refresh_token":"not_supported","token_type":"Bearer","expires_in":3600}"#,
        )
        .unwrap();
        assert_eq!(parsed.access_token, "tok");
        assert_eq!(parsed.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_cached_token_is_reused() {
        let auth = IamAuthenticator::new(
            Client::new(),
            "http://127.0.0.1:9/unreachable".into(),
            "key".into(),
        );
        *auth.cached.write().await = Some(CachedToken {
            access_token: "cached".into(),
            refresh_at: Instant::now() + Duration::from_secs(300),
        });

        assert_eq!(auth.bearer_token().await.unwrap(), "cached");
    }

    #[tokio::test]
    async fn test_stale_token_is_refreshed_once() {
        let (url, endpoint) = token_endpoint(3600).await;
        let auth = IamAuthenticator::new(Client::new(), url, "key".into());
        *auth.cached.write().await = Some(CachedToken {
            access_token: "expired".into(),
            refresh_at: Instant::now(),
        });

        assert_eq!(auth.bearer_token().await.unwrap(), "tok-1");
        assert_eq!(auth.bearer_token().await.unwrap(), "tok-1");
        assert_eq!(endpoint.issued.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_token_inside_refresh_margin_is_not_cached() {
        let (url, endpoint) = token_endpoint(30).await;
        let auth = IamAuthenticator::new(Client::new(), url, "key".into());

        assert_eq!(auth.bearer_token().await.unwrap(), "tok-1");
        assert_eq!(auth.bearer_token().await.unwrap(), "tok-2");
        assert_eq!(endpoint.issued.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rejected_api_key() {
        let (url, endpoint) = token_endpoint(3600).await;
        let auth = IamAuthenticator::new(Client::new(), url, "wrong".into());

        let err = auth.bearer_token().await.unwrap_err();
        match err {
            AppError::Authentication(msg) => {
                assert!(msg.contains("401"), "unexpected message: {}", msg);
                assert!(msg.contains("could not be found"));
            }
            other => panic!("expected authentication error, got {:?}", other),
        }
        assert_eq!(endpoint.issued.load(Ordering::SeqCst), 0);
        assert!(auth.cached.read().await.is_none());
    }
}
