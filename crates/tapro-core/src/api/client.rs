//! JSON API client.
//!
//! Owns the session context and the 401 refresh flow: every authenticated
//! request attaches the bearer token; a 401 triggers one refresh attempt
//! via `/api/auth/refresh` and one retry of the original request. If the
//! refresh fails, the session is cleared and the caller sees
//! `ApiError::AuthRequired`.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::CoreConfig;
use crate::constants::paths;
use crate::error::ApiError;
use crate::models::{Category, ChatMessage, Conversation, NewPost, Page, Post, PostKind};
use crate::session::{Session, UserInfo};

use super::transport::{ApiRequest, Transport};

pub struct ApiClient {
    transport: Arc<dyn Transport>,
    config: CoreConfig,
    session: RwLock<Option<Session>>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, config: CoreConfig) -> Self {
        Self {
            transport,
            config,
            session: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    pub fn set_session(&self, session: Option<Session>) {
        *self.session.write() = session;
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_some()
    }

    /// Execute a request with bearer attachment and one-shot refresh on
    /// 401. A 401 without any session maps straight to `AuthRequired`.
    pub(crate) async fn request(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let token = self
            .session
            .read()
            .as_ref()
            .map(|s| s.access_token.clone());

        let mut authed = request.clone();
        if let Some(token) = &token {
            authed = authed.with_bearer(token);
        }

        match self.transport.execute(authed).await {
            Err(ApiError::Http { status: 401, .. }) if token.is_none() => {
                Err(ApiError::AuthRequired)
            }
            Err(ApiError::Http { status: 401, .. }) => {
                debug!("access token rejected, attempting refresh");
                match self.refresh().await {
                    Ok(access) => self.transport.execute(request.with_bearer(&access)).await,
                    Err(err) => {
                        warn!(error = %err, "token refresh failed, clearing session");
                        self.set_session(None);
                        Err(ApiError::AuthRequired)
                    }
                }
            }
            other => other,
        }
    }

    async fn refresh(&self) -> Result<String, ApiError> {
        let refresh_token = self
            .session
            .read()
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
            .ok_or(ApiError::AuthRequired)?;

        let body = self
            .transport
            .execute(ApiRequest::post(paths::AUTH_REFRESH).with_bearer(&refresh_token))
            .await?;
        let access = body
            .get("accessToken")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Decode("refresh response missing accessToken".to_string()))?
            .to_string();

        if let Some(session) = self.session.write().as_mut() {
            session.access_token = access.clone();
        }
        Ok(access)
    }

    // ---- auth -----------------------------------------------------------

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let body = self
            .transport
            .execute(
                ApiRequest::post(paths::AUTH_LOGIN)
                    .with_body(json!({"email": email, "password": password})),
            )
            .await?;
        let session: Session = decode(body)?;
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    pub async fn register(&self, details: Value) -> Result<Session, ApiError> {
        let body = self
            .transport
            .execute(ApiRequest::post(paths::AUTH_REGISTER).with_body(details))
            .await?;
        let session: Session = decode(body)?;
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    /// Best-effort server logout; the local session is cleared regardless.
    pub async fn logout(&self) {
        if let Err(err) = self.request(ApiRequest::post(paths::AUTH_LOGOUT)).await {
            debug!(error = %err, "server logout failed, clearing local session anyway");
        }
        self.set_session(None);
    }

    pub async fn me(&self) -> Result<UserInfo, ApiError> {
        decode(self.request(ApiRequest::get(paths::AUTH_ME)).await?)
    }

    // ---- feeds ----------------------------------------------------------

    pub async fn discover(
        &self,
        category: Category,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<Page, ApiError> {
        let body = json!({
            "type": category.wire_type(),
            "lastDocId": cursor,
            "limit": limit,
        });
        let value = self
            .request(ApiRequest::post(paths::DISCOVER).with_body(body))
            .await?;
        Page::from_response(value)
    }

    pub async fn starred(
        &self,
        category: Category,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<Page, ApiError> {
        let body = json!({
            "type": category.wire_type(),
            "lastDocId": cursor,
            "limit": limit,
        });
        let value = self
            .request(ApiRequest::post(paths::STARRED).with_body(body))
            .await?;
        Page::from_response(value)
    }

    // ---- relations ------------------------------------------------------

    pub async fn star(&self, item_id: &str, item_type: &str) -> Result<(), ApiError> {
        self.request(
            ApiRequest::post(paths::STAR)
                .with_body(json!({"itemId": item_id, "itemType": item_type})),
        )
        .await
        .map(drop)
    }

    pub async fn unstar(&self, item_id: &str, item_type: &str) -> Result<(), ApiError> {
        self.request(
            ApiRequest::post(paths::UNSTAR)
                .with_body(json!({"itemId": item_id, "itemType": item_type})),
        )
        .await
        .map(drop)
    }

    pub async fn follow(&self, target_id: &str, target_type: &str) -> Result<(), ApiError> {
        self.request(
            ApiRequest::post(paths::FOLLOW)
                .with_body(json!({"targetId": target_id, "targetType": target_type})),
        )
        .await
        .map(drop)
    }

    pub async fn unfollow(&self, target_id: &str, target_type: &str) -> Result<(), ApiError> {
        self.request(
            ApiRequest::post(paths::UNFOLLOW)
                .with_body(json!({"targetId": target_id, "targetType": target_type})),
        )
        .await
        .map(drop)
    }

    // ---- posts ----------------------------------------------------------

    pub async fn posts(
        &self,
        kind: Option<PostKind>,
        author_id: Option<&str>,
    ) -> Result<Vec<Post>, ApiError> {
        let mut request = ApiRequest::get(paths::POSTS)
            .with_query("type", kind.map(|k| k.wire()).unwrap_or(""));
        if let Some(author_id) = author_id {
            request = request.with_query("authorId", author_id);
        }
        let value = self.request(request).await?;
        decode_field(value, "posts")
    }

    pub async fn create_post(&self, new_post: &NewPost) -> Result<Post, ApiError> {
        let body = serde_json::to_value(new_post).map_err(|e| ApiError::Decode(e.to_string()))?;
        let value = self
            .request(ApiRequest::post(paths::POSTS).with_body(body))
            .await?;
        decode_field(value, "post")
    }

    pub async fn like_post(&self, post_id: &str) -> Result<(), ApiError> {
        self.request(ApiRequest::post(paths::post_like(post_id)))
            .await
            .map(drop)
    }

    pub async fn bookmark_post(&self, post_id: &str) -> Result<(), ApiError> {
        self.request(ApiRequest::post(paths::post_bookmark(post_id)))
            .await
            .map(drop)
    }

    pub async fn comment_post(&self, post_id: &str, text: &str) -> Result<(), ApiError> {
        self.request(ApiRequest::post(paths::post_comment(post_id)).with_body(json!({"text": text})))
            .await
            .map(drop)
    }

    // ---- messaging ------------------------------------------------------

    pub async fn conversations(&self) -> Result<Vec<Conversation>, ApiError> {
        let value = self.request(ApiRequest::get(paths::CONVERSATIONS)).await?;
        decode_field(value, "conversations")
    }

    pub async fn open_conversation(&self, participant_id: &str) -> Result<Conversation, ApiError> {
        let value = self
            .request(
                ApiRequest::post(paths::CONVERSATIONS)
                    .with_body(json!({"participantId": participant_id})),
            )
            .await?;
        decode_field(value, "conversation")
    }

    pub async fn messages(&self, conversation_id: &str) -> Result<Vec<ChatMessage>, ApiError> {
        let value = self
            .request(ApiRequest::get(paths::conversation_messages(conversation_id)))
            .await?;
        decode_field(value, "messages")
    }

    pub async fn send_message(
        &self,
        conversation_id: &str,
        text: &str,
    ) -> Result<ChatMessage, ApiError> {
        let value = self
            .request(
                ApiRequest::post(paths::conversation_messages(conversation_id))
                    .with_body(json!({"message": text})),
            )
            .await?;
        decode_field(value, "message")
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Decode the envelope field the endpoint wraps its payload in. A missing
/// field is a `Decode` error naming the field.
fn decode_field<T: DeserializeOwned>(mut value: Value, field: &str) -> Result<T, ApiError> {
    let inner = value
        .get_mut(field)
        .map(Value::take)
        .ok_or_else(|| ApiError::Decode(format!("response missing `{field}`")))?;
    decode(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::mock::{MockTransport, Reply};
    use crate::session::Session;

    fn client_with_session(transport: Arc<MockTransport>) -> ApiClient {
        let client = ApiClient::new(transport, CoreConfig::default());
        client.set_session(Some(Session {
            access_token: "stale".to_string(),
            refresh_token: Some("refresh-1".to_string()),
            user: None,
        }));
        client
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let transport = MockTransport::new();
        transport.push(Reply::Json(json!({"posts": []})));
        let client = client_with_session(Arc::clone(&transport));

        client.posts(None, None).await.unwrap();
        let request = transport.last_request().unwrap();
        assert_eq!(request.bearer.as_deref(), Some("stale"));
    }

    #[tokio::test]
    async fn test_refresh_and_retry_on_401() {
        let transport = MockTransport::new();
        transport.push(Reply::Status(401, "token expired"));
        transport.push(Reply::Json(json!({"accessToken": "fresh"})));
        transport.push(Reply::Json(json!({"posts": []})));
        let client = client_with_session(Arc::clone(&transport));

        client.posts(None, None).await.unwrap();

        assert_eq!(transport.call_count(), 3);
        let requests = transport.recorded_requests();
        assert_eq!(requests[1].path, paths::AUTH_REFRESH);
        assert_eq!(requests[1].bearer.as_deref(), Some("refresh-1"));
        assert_eq!(requests[2].bearer.as_deref(), Some("fresh"));
        assert_eq!(client.session().unwrap().access_token, "fresh");
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_session() {
        let transport = MockTransport::new();
        transport.push(Reply::Status(401, "token expired"));
        transport.push(Reply::Status(401, "refresh expired"));
        let client = client_with_session(Arc::clone(&transport));

        let err = client.posts(None, None).await.unwrap_err();
        assert!(matches!(err, ApiError::AuthRequired));
        assert!(client.session().is_none());
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_401_without_session_is_auth_required() {
        let transport = MockTransport::new();
        transport.push(Reply::Status(401, "no token"));
        let client = ApiClient::new(Arc::clone(&transport) as Arc<dyn Transport>, CoreConfig::default());

        let err = client.posts(None, None).await.unwrap_err();
        assert!(matches!(err, ApiError::AuthRequired));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_discover_wire_shape() {
        let transport = MockTransport::new();
        transport.push(crate::api::transport::mock::page_reply(&["s1"], Some("s1")));
        let client = ApiClient::new(Arc::clone(&transport) as Arc<dyn Transport>, CoreConfig::default());

        let page = client
            .discover(Category::Investors, Some("cursor-9"), 10)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);

        let request = transport.last_request().unwrap();
        assert_eq!(request.path, paths::DISCOVER);
        let body = request.body.unwrap();
        assert_eq!(body["type"], "investor");
        assert_eq!(body["lastDocId"], "cursor-9");
        assert_eq!(body["limit"], 10);
    }

    #[tokio::test]
    async fn test_login_stores_session() {
        let transport = MockTransport::new();
        transport.push(Reply::Json(json!({
            "accessToken": "a1",
            "refreshToken": "r1",
            "user": {"id": "u1", "name": "Jo"},
        })));
        let client = ApiClient::new(Arc::clone(&transport) as Arc<dyn Transport>, CoreConfig::default());

        let session = client.login("jo@example.com", "hunter2").await.unwrap();
        assert_eq!(session.access_token, "a1");
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn test_missing_envelope_field_is_a_decode_error() {
        let transport = MockTransport::new();
        transport.push(Reply::Json(json!({"items": []})));
        let client = ApiClient::new(Arc::clone(&transport) as Arc<dyn Transport>, CoreConfig::default());

        let err = client.posts(None, None).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(ref msg) if msg.contains("posts")));
    }

    #[tokio::test]
    async fn test_logout_clears_session_even_on_server_error() {
        let transport = MockTransport::new();
        transport.push(Reply::NetworkDown);
        let client = client_with_session(Arc::clone(&transport));

        client.logout().await;
        assert!(!client.is_authenticated());
    }
}
