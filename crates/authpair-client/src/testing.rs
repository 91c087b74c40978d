//! Scripted transport for exercising the retry protocol

use crate::error::{ClientError, Result};
use crate::transport::{ApiRequest, ApiResponse, Transport};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;

pub(crate) const VALID_REFRESH: &str = "refresh-1";
pub(crate) const FRESH_ACCESS: &str = "access-fresh";

/// Fake auth server
///
/// `/auth/refresh` accepts only `VALID_REFRESH` and hands out `FRESH_ACCESS`.
/// `/auth/profile` accepts only `FRESH_ACCESS` unless `always_unauthorized`.
#[derive(Default)]
pub(crate) struct MockTransport {
    pub always_unauthorized: bool,
    pub offline: bool,
    pub log: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().unwrap().clone()
    }

    fn session() -> Value {
        json!({
            "access_token": "access-login",
            "refresh_token": VALID_REFRESH,
            "user": {
                "id": "7f1c5a4e-3b52-4a1c-9a53-2f2d7c1e9b10",
                "email": "a@x.com",
                "name": "Ann"
            }
        })
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.log.lock().unwrap().push(request.clone());

        if self.offline {
            return Err(ClientError::Transport("connection refused".to_string()));
        }

        let unauthorized = ApiResponse::new(
            401,
            json!({ "code": "UNAUTHORIZED", "message": "Invalid token" }),
        );

        let response = match request.path.as_str() {
            "/auth/login" | "/auth/register" => ApiResponse::new(200, Self::session()),
            "/auth/logout" => ApiResponse::new(200, json!({ "message": "Logged out successfully" })),
            "/auth/refresh" => {
                let token = request
                    .body
                    .as_ref()
                    .and_then(|b| b.get("refresh_token"))
                    .and_then(Value::as_str);
                if token == Some(VALID_REFRESH) {
                    ApiResponse::new(200, json!({ "access_token": FRESH_ACCESS }))
                } else {
                    unauthorized
                }
            }
            "/auth/profile" => {
                let expected = format!("Bearer {FRESH_ACCESS}");
                if !self.always_unauthorized && request.authorization.as_deref() == Some(expected.as_str()) {
                    ApiResponse::new(200, Self::session()["user"].clone())
                } else {
                    unauthorized
                }
            }
            _ => ApiResponse::new(404, Value::Null),
        };

        Ok(response)
    }
}
