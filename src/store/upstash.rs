use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{CounterStore, StoreError};

// Upstash REST reply: exactly one of the two fields is set
#[derive(Deserialize)]
struct Reply {
    result: Option<Value>,
    error: Option<String>,
}

/// Counter store backed by the Upstash Redis REST API.
///
/// Each command is a `POST` of its arguments as a JSON array to the database
/// URL, authenticated with the REST token.
pub struct UpstashStore {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl UpstashStore {
    pub fn new(client: reqwest::Client, url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    async fn command(&self, args: Value) -> Result<Value, StoreError> {
        let res = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await?;

        let status = res.status();
        let reply: Reply = res.json().await?;

        if let Some(error) = reply.error {
            return Err(StoreError::Rejected(error));
        }
        if !status.is_success() {
            return Err(StoreError::UnexpectedReply(format!("HTTP {status}")));
        }
        reply
            .result
            .ok_or_else(|| StoreError::UnexpectedReply("missing result".to_string()))
    }
}

#[async_trait]
impl CounterStore for UpstashStore {
    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        let result = self.command(json!(["INCR", key])).await?;
        result
            .as_i64()
            .ok_or_else(|| StoreError::UnexpectedReply(format!("INCR returned {result}")))
    }

    async fn set_expiry(&self, key: &str, seconds: u64) -> Result<(), StoreError> {
        self.command(json!(["EXPIRE", key, seconds])).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, routing::post};
    use std::sync::Arc;
    use tokio::net::TcpListener;

    // Fake Upstash endpoint backed by a MemoryStore
    async fn spawn_fake_upstash(token: &'static str) -> String {
        let store = Arc::new(crate::store::MemoryStore::new());
        let app = Router::new().route(
            "/",
            post(move |headers: HeaderMap, Json(args): Json<Vec<Value>>| {
                let store = Arc::clone(&store);
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default();
                    if auth != format!("Bearer {token}") {
                        return (
                            axum::http::StatusCode::UNAUTHORIZED,
                            Json(json!({"error": "Unauthorized"})),
                        );
                    }
                    let key = args[1].as_str().unwrap_or_default().to_string();
                    match args[0].as_str() {
                        Some("INCR") => {
                            let n = store.increment(&key).await.unwrap();
                            (axum::http::StatusCode::OK, Json(json!({"result": n})))
                        }
                        Some("EXPIRE") => {
                            let secs = args[2].as_u64().unwrap_or_default();
                            store.set_expiry(&key, secs).await.unwrap();
                            (axum::http::StatusCode::OK, Json(json!({"result": 1})))
                        }
                        _ => (
                            axum::http::StatusCode::BAD_REQUEST,
                            Json(json!({"error": "ERR unknown command"})),
                        ),
                    }
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn increments_through_rest_api() {
        let url = spawn_fake_upstash("secret").await;
        let store = UpstashStore::new(reqwest::Client::new(), url, "secret");

        assert_eq!(store.increment("rate_limit:1.2.3.4").await.unwrap(), 1);
        assert_eq!(store.increment("rate_limit:1.2.3.4").await.unwrap(), 2);
        store.set_expiry("rate_limit:1.2.3.4", 60).await.unwrap();
    }

    #[tokio::test]
    async fn error_reply_is_rejected() {
        let url = spawn_fake_upstash("secret").await;
        let store = UpstashStore::new(reqwest::Client::new(), url, "wrong");

        let err = store.increment("k").await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(ref msg) if msg == "Unauthorized"));
    }

    #[tokio::test]
    async fn unreachable_store_is_http_error() {
        // bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let store = UpstashStore::new(reqwest::Client::new(), format!("http://{addr}"), "t");
        assert!(matches!(
            store.increment("k").await.unwrap_err(),
            StoreError::Http(_)
        ));
    }
}
