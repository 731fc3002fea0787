//! Profile and registration endpoints.
//!
//! Profile documents are schemaless on the backend; they pass through as
//! raw JSON and the caller renders what it finds.

use serde_json::Value;

use crate::constants::paths;
use crate::error::ApiError;

use super::client::ApiClient;
use super::transport::ApiRequest;

impl ApiClient {
    pub async fn get_user(&self, user_id: &str) -> Result<Value, ApiError> {
        self.request(ApiRequest::get(paths::user(user_id))).await
    }

    pub async fn update_user(&self, user_id: &str, profile: Value) -> Result<(), ApiError> {
        self.request(ApiRequest::put(paths::user(user_id)).with_body(profile))
            .await
            .map(drop)
    }

    pub async fn user_startups(&self, user_id: &str) -> Result<Vec<Value>, ApiError> {
        let value = self
            .request(ApiRequest::get(paths::user_startups(user_id)))
            .await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn get_startup(&self, startup_id: &str) -> Result<Value, ApiError> {
        self.request(ApiRequest::get(paths::startup(startup_id)))
            .await
    }

    pub async fn update_startup(&self, startup_id: &str, profile: Value) -> Result<(), ApiError> {
        self.request(ApiRequest::put(paths::startup(startup_id)).with_body(profile))
            .await
            .map(drop)
    }

    pub async fn get_investor(&self, investor_id: &str) -> Result<Value, ApiError> {
        self.request(ApiRequest::get(paths::investor(investor_id)))
            .await
    }

    /// Returns the new startup's id.
    pub async fn submit_startup(&self, details: Value) -> Result<String, ApiError> {
        let value = self
            .request(ApiRequest::post(paths::STARTUP_SUBMIT).with_body(details))
            .await?;
        value
            .get("startupId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ApiError::Decode("response missing `startupId`".to_string()))
    }

    /// Returns the new investor's id.
    pub async fn register_investor(&self, details: Value) -> Result<String, ApiError> {
        let value = self
            .request(ApiRequest::post(paths::INVESTOR_REGISTER).with_body(details))
            .await?;
        value
            .get("investorId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ApiError::Decode("response missing `investorId`".to_string()))
    }
}
