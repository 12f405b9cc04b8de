//! # Tinycache Client
//!
//! An async Rust client for the tinycache HTTP server.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tinycache_client::TinyCacheClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tinycache_client::Error> {
//!     let client = TinyCacheClient::connect("http://localhost:9000")?;
//!
//!     // Store a value with a 5-minute TTL
//!     client.set("my-key", &"my-value", Duration::from_secs(300)).await?;
//!
//!     if let Some(value) = client.get("my-key").await? {
//!         println!("Got: {}", value);
//!     }
//!
//!     let deleted = client.delete(&["my-key"]).await?;
//!     println!("Deleted {} key(s)", deleted);
//!
//!     Ok(())
//! }
//! ```

mod error;
mod options;

pub use error::Error;
pub use options::TinyCacheClientOptions;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

#[derive(Serialize)]
struct SetBody<'a, T: Serialize + ?Sized> {
    key: &'a str,
    value: &'a T,
    ttl: i64,
}

#[derive(Serialize)]
struct GetBody<'a> {
    key: &'a str,
}

#[derive(Serialize)]
struct DelBody<'a> {
    keys: Vec<&'a str>,
}

#[derive(Serialize)]
struct KeysBody<'a> {
    pattern: &'a str,
}

/// Error body the server sends with a rejected request
#[derive(Deserialize)]
struct ErrorBody {
    op: String,
    err: String,
}

/// A client for the tinycache HTTP API.
///
/// The client is cheap to clone; clones share one connection pool.
#[derive(Clone, Debug)]
pub struct TinyCacheClient {
    http: reqwest::Client,
    base: Url,
}

impl TinyCacheClient {
    /// Create a client for the server at `url` with default options.
    pub fn connect(url: &str) -> Result<Self, Error> {
        Self::new(TinyCacheClientOptions::new(url))
    }

    /// Create a client with custom options.
    pub fn new(options: TinyCacheClientOptions) -> Result<Self, Error> {
        let base = Url::parse(&options.url).map_err(|e| Error::InvalidUrl {
            url: options.url.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                url: options.url,
                reason: "not a base URL".to_string(),
            });
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base,
        })
    }

    /// URL of an API endpoint, appended to whatever path the base URL carries.
    fn endpoint(&self, name: &str) -> Url {
        let mut url = self.base.clone();
        let path = format!("{}/{}", self.base.path().trim_end_matches('/'), name);
        url.set_path(&path);
        url
    }

    async fn call<B, R>(&self, op: &str, name: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(name);
        tracing::debug!("{} {}", op, url);

        let response = self.http.post(url).json(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<ErrorBody>(&bytes) {
                Ok(body) => Error::Server {
                    status: status.as_u16(),
                    op: body.op,
                    message: body.err,
                },
                Err(_) => Error::Server {
                    status: status.as_u16(),
                    op: op.to_string(),
                    message: String::from_utf8_lossy(&bytes).trim().to_string(),
                },
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Store a value in the cache.
    ///
    /// `Duration::ZERO` stores the value without expiration.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), Error> {
        let ttl = i64::try_from(ttl.as_nanos()).unwrap_or(i64::MAX);
        let _: String = self.call("SET", "set", &SetBody { key, value, ttl }).await?;
        Ok(())
    }

    /// Retrieve a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    pub async fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        self.call("GET", "get", &GetBody { key }).await
    }

    /// Retrieve a value and deserialize it into `T`.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, Error> {
        match self.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Delete keys from the cache.
    ///
    /// Returns how many of them existed and had not yet expired.
    pub async fn delete<K: AsRef<str>>(&self, keys: &[K]) -> Result<usize, Error> {
        let keys = keys.iter().map(AsRef::as_ref).collect();
        self.call("DEL", "del", &DelBody { keys }).await
    }

    /// List live keys matching a glob pattern (e.g. `"user:*"`).
    pub async fn keys(&self, pattern: &str) -> Result<Vec<String>, Error> {
        self.call("KEYS", "keys", &KeysBody { pattern }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    /// Serves canned answers in place of a real tinycache server
    async fn spawn_mock_server() -> String {
        let app = Router::new()
            .route("/cache/set", post(|Json(body): Json<Value>| async move {
                assert_eq!(body["ttl"], json!(1_500_000_000i64));
                Json("OK")
            }))
            .route("/cache/get", post(|Json(body): Json<Value>| async move {
                if body["key"] == "user:1" {
                    Json(json!({"name": "alice", "age": 30}))
                } else {
                    Json(Value::Null)
                }
            }))
            .route("/cache/del", post(|Json(body): Json<Value>| async move {
                Json(body["keys"].as_array().map_or(0, |keys| keys.len()))
            }))
            .route("/cache/keys", post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"op": "KEYS", "err": "unterminated character class starting at offset 0"})),
                )
            }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/cache/", addr)
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = TinyCacheClient::connect("http://localhost:9000/api/").unwrap();
        assert_eq!(client.endpoint("set").as_str(), "http://localhost:9000/api/set");

        let client = TinyCacheClient::connect("http://localhost:9000").unwrap();
        assert_eq!(client.endpoint("keys").as_str(), "http://localhost:9000/keys");
    }

    #[test]
    fn test_invalid_url() {
        let err = TinyCacheClient::connect("not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));

        let err = TinyCacheClient::connect("mailto:cache@example.com").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        name: String,
        age: u32,
    }

    #[tokio::test]
    async fn test_operations_against_mock_server() {
        let client = TinyCacheClient::connect(&spawn_mock_server().await).unwrap();

        client.set("user:1", &json!({"name": "alice"}), Duration::from_millis(1500)).await.unwrap();

        assert_eq!(client.get("missing").await.unwrap(), None);

        let user: Option<User> = client.get_as("user:1").await.unwrap();
        assert_eq!(user, Some(User { name: "alice".into(), age: 30 }));

        assert_eq!(client.delete(&["a", "b", "c"]).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_rejected_request_maps_to_server_error() {
        let client = TinyCacheClient::connect(&spawn_mock_server().await).unwrap();

        match client.keys("[").await {
            Err(Error::Server { status, op, message }) => {
                assert_eq!(status, 400);
                assert_eq!(op, "KEYS");
                assert!(message.contains("unterminated"));
            }
            other => panic!("Expected server error, got {:?}", other),
        }
    }
}
