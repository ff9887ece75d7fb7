use axum::{
    body::Body,
    http::{Method, Request, Response, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestSetup;

// ============================================================================
// Request helpers
// ============================================================================

async fn read_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}

#[allow(dead_code)]
impl TestSetup {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self.send(builder.body(body).unwrap()).await;
        let status = response.status();
        (status, read_body(response).await)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    pub fn admin(&self) -> Option<&str> {
        Some(self.admin_token.as_str())
    }

    /// Registers a user in category 1 with password `pw-<email>`
    pub async fn register_user(&self, name: &str, email: &str) {
        let (status, body) = self
            .post(
                "/user/register",
                None,
                json!({
                    "name": name,
                    "email": email,
                    "phone": "0300-0000000",
                    "category_id": 1,
                    "password": format!("pw-{}", email),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    }

    /// Logs in a user registered by `register_user`, returning (token, user_id)
    pub async fn login_user(&self, email: &str) -> (String, i64) {
        let (status, body) = self
            .post(
                "/user/login",
                None,
                json!({"email": email, "password": format!("pw-{}", email)}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["user_id"].as_i64().unwrap(),
        )
    }

    pub async fn register_and_login(&self, name: &str, email: &str) -> (String, i64) {
        self.register_user(name, email).await;
        self.login_user(email).await
    }
}
