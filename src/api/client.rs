use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client as HttpClient;
use tracing::warn;

use super::models::{
    ApiError, ApiTransaction, CreateTransactionRequest, RateLimitResponse,
    UpdateTransactionRequest,
};
use crate::models::{NewTransaction, Transaction, TransactionPatch};

/// Remote transaction gateway contract
///
/// `list` returns the full authoritative collection in server order; the
/// engine re-paginates it client-side. All four operations fail with
/// `ApiError` on network or server problems.
#[async_trait]
pub trait TransactionService: Send + Sync {
    async fn list(&self) -> Result<Vec<Transaction>, ApiError>;

    async fn create(&self, new: &NewTransaction) -> Result<Transaction, ApiError>;

    async fn update(&self, id: &str, patch: &TransactionPatch) -> Result<Transaction, ApiError>;

    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}

/// FinTrack API client for transaction CRUD
pub struct HttpTransactionService {
    http_client: HttpClient,
    api_token: String,
    base_url: String,
}

impl HttpTransactionService {
    /// Create a new API client
    pub fn new(base_url: String, api_token: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_token,
            base_url,
        }
    }

    /// Create a new client with a custom base URL (for testing)
    pub fn with_base_url(api_token: String, base_url: String) -> Self {
        Self::new(base_url, api_token)
    }

    /// Create default headers with authorization
    fn create_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth_value = HeaderValue::from_str(&format!("Bearer {}", self.api_token))
            .map_err(|e| ApiError::Request(format!("Failed to create auth header: {}", e)))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    /// Parse error response based on HTTP status code
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let status_code = status.as_u16();
        let body_text = response.text().await.unwrap_or_default();

        match status_code {
            400 => {
                // Try to parse JSON error
                if let Ok(err_json) = serde_json::from_str::<serde_json::Value>(&body_text) {
                    let message = err_json
                        .get("message")
                        .and_then(|v| v.as_str())
                        .unwrap_or(&body_text);
                    ApiError::BadRequest(message.to_string())
                } else {
                    ApiError::BadRequest(body_text)
                }
            }
            401 => ApiError::Unauthorized(body_text),
            403 => ApiError::Forbidden(body_text),
            404 => ApiError::NotFound(body_text),
            429 => {
                if let Ok(rate_limit) = serde_json::from_str::<RateLimitResponse>(&body_text) {
                    let retry_after = rate_limit.retry_after.unwrap_or(1000);
                    let is_global = rate_limit.global.unwrap_or(false);
                    warn!(
                        "Rate limited (global: {}), retry after {} ms",
                        is_global, retry_after
                    );
                    ApiError::RateLimited {
                        retry_after,
                        is_global,
                    }
                } else {
                    warn!("Rate limited, but could not parse retry_after");
                    ApiError::RateLimited {
                        retry_after: 1000,
                        is_global: false,
                    }
                }
            }
            500..=599 => {
                warn!("Server error {}: {}", status_code, body_text);
                ApiError::ServerError(status_code as i32, body_text)
            }
            _ => ApiError::HttpError(status_code as i32, body_text),
        }
    }
}

#[async_trait]
impl TransactionService for HttpTransactionService {
    /// GET /transactions
    ///
    /// Retrieves every transaction visible to the current user, newest first.
    async fn list(&self) -> Result<Vec<Transaction>, ApiError> {
        let url = format!("{}/transactions", self.base_url);
        let headers = self.create_headers()?;

        let response = self
            .http_client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| ApiError::Request(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        let wire = response
            .json::<Vec<ApiTransaction>>()
            .await
            .map_err(|e| ApiError::Deserialization(format!("Failed to parse response: {}", e)))?;
        Ok(wire.into_iter().map(ApiTransaction::into_domain).collect())
    }

    /// POST /transactions
    ///
    /// Creates a transaction and returns the server-confirmed record with its
    /// assigned identifier and timestamps.
    async fn create(&self, new: &NewTransaction) -> Result<Transaction, ApiError> {
        let url = format!("{}/transactions", self.base_url);
        let headers = self.create_headers()?;
        let body = CreateTransactionRequest::from(new);

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Request(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        let wire = response
            .json::<ApiTransaction>()
            .await
            .map_err(|e| ApiError::Deserialization(format!("Failed to parse response: {}", e)))?;
        Ok(wire.into_domain())
    }

    /// PATCH /transactions/{id}
    ///
    /// Sends only the changed fields; returns the server-confirmed full
    /// transaction.
    async fn update(&self, id: &str, patch: &TransactionPatch) -> Result<Transaction, ApiError> {
        let url = format!("{}/transactions/{}", self.base_url, id);
        let headers = self.create_headers()?;
        let body = UpdateTransactionRequest::from(patch);

        let response = self
            .http_client
            .patch(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Request(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        let wire = response
            .json::<ApiTransaction>()
            .await
            .map_err(|e| ApiError::Deserialization(format!("Failed to parse response: {}", e)))?;
        Ok(wire.into_domain())
    }

    /// DELETE /transactions/{id}
    ///
    /// Acknowledgement only; any success status counts.
    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = format!("{}/transactions/{}", self.base_url, id);
        let headers = self.create_headers()?;

        let response = self
            .http_client
            .delete(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| ApiError::Request(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        Ok(())
    }
}
