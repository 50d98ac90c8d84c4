//! Rehive ledger adapter

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::entities::{CreditRequest, LedgerIdentity, LedgerTransaction, TransferRequest};
use crate::domain::traits::{Ledger, UserLookup};
use crate::application::errors::LedgerError;

/// Rehive platform API base URL
pub const API_BASE: &str = "https://api.rehive.com/3";

/// Every Rehive response wraps its payload in `data`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
struct UserRecord {
    id: String,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionRecord {
    id: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Serialize)]
struct CreateUserRequest<'a> {
    username: &'a str,
    metadata: &'a serde_json::Value,
}

#[derive(Serialize)]
struct CreditBody<'a> {
    user: &'a str,
    amount: u64,
    currency: &'a str,
    status: &'a str,
}

#[derive(Serialize)]
struct TransferBody<'a> {
    user: &'a str,
    recipient: &'a str,
    amount: u64,
    currency: &'a str,
}

/// Admin-API client for the Rehive accounts/transactions service
pub struct RehiveLedger {
    api_key: String,
    client: Client,
    base_url: String,
}

impl RehiveLedger {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, LedgerError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key: api_key.into(),
            client,
            base_url: API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the API URL for an admin endpoint
    fn api_url(&self, path: &str) -> String {
        format!("{}/admin/{}", self.base_url, path)
    }

    fn auth(&self) -> String {
        format!("Token {}", self.api_key)
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, LedgerError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::NotFound(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, LedgerError> {
        let response = self
            .client
            .post(self.api_url(path))
            .header("Authorization", self.auth())
            .json(body)
            .send()
            .await?;
        Self::read(response).await
    }
}

/// The username filter may return near matches or records without a
/// username; only records whose username equals `handle` count
fn classify_lookup(handle: &str, records: Vec<UserRecord>) -> UserLookup {
    let mut matches: Vec<UserRecord> = records
        .into_iter()
        .filter(|r| r.username.as_deref() == Some(handle))
        .collect();

    match matches.len() {
        0 => UserLookup::NotFound,
        1 => {
            let record = matches.remove(0);
            UserLookup::Found(LedgerIdentity::new(record.id, handle))
        }
        count => UserLookup::Ambiguous { count },
    }
}

#[async_trait]
impl Ledger for RehiveLedger {
    fn name(&self) -> &str {
        "rehive"
    }

    async fn find_user_by_handle(&self, handle: &str) -> Result<UserLookup, LedgerError> {
        let response = self
            .client
            .get(self.api_url("users/"))
            .header("Authorization", self.auth())
            .query(&[("username", handle)])
            .send()
            .await?;

        match Self::read::<Page<UserRecord>>(response).await {
            Ok(page) => Ok(classify_lookup(handle, page.results)),
            Err(LedgerError::NotFound(_)) => Ok(UserLookup::NotFound),
            Err(e) => Err(e),
        }
    }

    async fn create_user(&self, handle: &str, metadata: serde_json::Value) -> Result<LedgerIdentity, LedgerError> {
        let body = CreateUserRequest {
            username: handle,
            metadata: &metadata,
        };
        let record: UserRecord = self.post("users/", &body).await?;
        Ok(LedgerIdentity::new(record.id, handle))
    }

    async fn create_credit(&self, request: &CreditRequest) -> Result<LedgerTransaction, LedgerError> {
        let body = CreditBody {
            user: &request.handle,
            amount: request.amount_minor,
            currency: &request.currency,
            status: request.status.as_str(),
        };
        let record: TransactionRecord = self.post("transactions/credit/", &body).await?;
        Ok(LedgerTransaction {
            id: record.id,
            status: record.status,
        })
    }

    async fn create_transfer(&self, request: &TransferRequest) -> Result<LedgerTransaction, LedgerError> {
        let body = TransferBody {
            user: &request.from_handle,
            recipient: &request.to_handle,
            amount: request.amount_minor,
            currency: &request.currency,
        };
        let record: TransactionRecord = self.post("transactions/transfer/", &body).await?;
        Ok(LedgerTransaction {
            id: record.id,
            status: record.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Answer one HTTP request with a canned response; the raw request head
    /// is handed back through the receiver.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (seen_tx, seen_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let _ = seen_tx.send(String::from_utf8_lossy(&request).to_string());

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        (format!("http://{}/3", addr), seen_rx)
    }

    fn ledger_at(base_url: String) -> RehiveLedger {
        RehiveLedger {
            api_key: "key".to_string(),
            client: Client::builder().no_proxy().build().unwrap(),
            base_url,
        }
    }

    #[tokio::test]
    async fn test_lookup_sends_username_filter_and_token() {
        let (base, seen) = serve_once(
            "200 OK",
            r#"{"status":"success","data":{"results":[{"id":"u-1","username":"alice"}]}}"#,
        )
        .await;

        let lookup = ledger_at(base).find_user_by_handle("alice").await.unwrap();
        assert_eq!(lookup, UserLookup::Found(LedgerIdentity::new("u-1", "alice")));

        let request = seen.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /3/admin/users/?username=alice "), "{request}");
        assert!(request.contains("authorization: token key"), "{request}");
    }

    #[tokio::test]
    async fn test_lookup_404_is_not_found() {
        let (base, _seen) = serve_once("404 Not Found", r#"{"status":"error"}"#).await;
        let lookup = ledger_at(base).find_user_by_handle("alice").await.unwrap();
        assert_eq!(lookup, UserLookup::NotFound);
    }

    #[tokio::test]
    async fn test_lookup_empty_page_is_not_found() {
        let (base, _seen) = serve_once("200 OK", r#"{"status":"success","data":{"results":[]}}"#).await;
        let lookup = ledger_at(base).find_user_by_handle("alice").await.unwrap();
        assert_eq!(lookup, UserLookup::NotFound);
    }

    #[tokio::test]
    async fn test_lookup_server_error_is_not_not_found() {
        let (base, _seen) = serve_once("503 Service Unavailable", "maintenance").await;
        let err = ledger_at(base).find_user_by_handle("alice").await.unwrap_err();
        assert_eq!(
            err,
            LedgerError::Api {
                status: 503,
                message: "maintenance".to_string()
            }
        );
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let (base, _seen) = serve_once("200 OK", "not json").await;
        let err = ledger_at(base).find_user_by_handle("alice").await.unwrap_err();
        assert!(matches!(err, LedgerError::Parse(_)));
    }

    fn record(id: &str, username: &str) -> UserRecord {
        UserRecord {
            id: id.into(),
            username: Some(username.into()),
        }
    }

    #[test]
    fn test_classify_lookup() {
        assert_eq!(classify_lookup("bob", vec![]), UserLookup::NotFound);
        assert_eq!(
            classify_lookup("bob", vec![record("1", "bob")]),
            UserLookup::Found(LedgerIdentity::new("1", "bob"))
        );
        assert_eq!(
            classify_lookup("bob", vec![record("1", "bob"), record("2", "bob")]),
            UserLookup::Ambiguous { count: 2 }
        );
        assert_eq!(
            classify_lookup("bob", vec![record("1", "bobby"), record("2", "bob")]),
            UserLookup::Found(LedgerIdentity::new("2", "bob"))
        );
    }

    #[test]
    fn test_records_without_username_never_match() {
        let nameless = |id: &str| UserRecord {
            id: id.into(),
            username: None,
        };
        assert_eq!(classify_lookup("bob", vec![nameless("1")]), UserLookup::NotFound);
        assert_eq!(
            classify_lookup("bob", vec![nameless("1"), nameless("2"), record("3", "bob")]),
            UserLookup::Found(LedgerIdentity::new("3", "bob"))
        );
    }

    #[test]
    fn test_page_envelope_parses() {
        let body = r#"{"status":"success","data":{"count":1,"next":null,"results":[{"id":"abc","username":"bob","email":null}]}}"#;
        let envelope: Envelope<Page<UserRecord>> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.data.results.len(), 1);
        assert_eq!(envelope.data.results[0].id, "abc");
    }

    #[test]
    fn test_transfer_body_shape() {
        let body = TransferBody {
            user: "alice",
            recipient: "bob",
            amount: 50_000_000,
            currency: "XLM",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"user": "alice", "recipient": "bob", "amount": 50_000_000u64, "currency": "XLM"})
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let ledger = RehiveLedger::new("key", Duration::from_secs(1))
            .unwrap()
            .with_base_url("http://localhost:8000/3/");
        assert_eq!(ledger.api_url("users/"), "http://localhost:8000/3/admin/users/");
    }
}
