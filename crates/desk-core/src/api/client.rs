//! Backend HTTP client.
//!
//! Forms submit through the [`TradingApi`] implementation; dashboard panels
//! use the typed read methods. Every call is a single attempt.

use super::{Endpoint, HttpReply, TradingApi};
use crate::config::ApiConfig;
use crate::submission::interpret::{detail_message, UNKNOWN_ERROR};
use crate::types::{
    ActiveSessions, DashboardStats, HealthStatus, PositionDetails, SessionDetail, SessionIds,
    TradeHistory,
};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

/// Client for the trading backend's JSON API.
pub struct DeskClient {
    base_url: Url,
    http_client: reqwest::Client,
}

/// Everything the home panel shows, fetched in one go.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub sessions: ActiveSessions,
    pub stats: DashboardStats,
}

impl DeskClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        let mut base_url = Url::parse(&config.base_url)?;
        // Joining relative paths replaces the last segment unless it ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> Result<Url> {
        Ok(self.base_url.join(endpoint.path().trim_start_matches('/'))?)
    }

    fn session_url(&self, session_id: &str) -> Result<Url> {
        let mut url = self.url(Endpoint::Sessions)?;
        url.path_segments_mut()
            .map_err(|_| Error::Config {
                message: format!("base URL {} cannot carry a path", self.base_url),
            })?
            .push(session_id);
        Ok(url)
    }

    fn position_url(&self, ticket: u64, account: u64) -> Result<Url> {
        let mut url = self.url(Endpoint::PositionDetails)?;
        url.query_pairs_mut()
            .append_pair("ticket", &ticket.to_string())
            .append_pair("account", &account.to_string());
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(url = %url, "GET");

        let response = self
            .http_client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let result = decode_read(status, &bytes);
        if let Err(Error::Api { message, .. }) = &result {
            warn!(status, url = %url, message = %message, "Backend request failed");
        }
        result
    }

    /// `GET /active_sessions`
    pub async fn active_sessions(&self) -> Result<ActiveSessions> {
        self.get(self.url(Endpoint::ActiveSessions)?).await
    }

    /// `GET /trade_history`
    pub async fn trade_history(&self) -> Result<TradeHistory> {
        self.get(self.url(Endpoint::TradeHistory)?).await
    }

    /// `GET /dashboard_stats`
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.get(self.url(Endpoint::DashboardStats)?).await
    }

    /// `GET /sessions` - ids of every active session.
    pub async fn session_ids(&self) -> Result<SessionIds> {
        self.get(self.url(Endpoint::Sessions)?).await
    }

    /// `GET /sessions/{id}` - one session with its open positions.
    pub async fn session(&self, session_id: &str) -> Result<SessionDetail> {
        self.get(self.session_url(session_id)?).await
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<HealthStatus> {
        self.get(self.url(Endpoint::Health)?).await
    }

    /// `GET /position_details` - live SL/TP of one broker position.
    pub async fn position_details(&self, ticket: u64, account: u64) -> Result<PositionDetails> {
        self.get(self.position_url(ticket, account)?).await
    }

    /// Active sessions and statistics, requested concurrently.
    pub async fn dashboard(&self) -> Result<Dashboard> {
        let (sessions, stats) = tokio::try_join!(self.active_sessions(), self.dashboard_stats())?;
        Ok(Dashboard { sessions, stats })
    }
}

#[async_trait]
impl TradingApi for DeskClient {
    async fn post_json(&self, endpoint: Endpoint, body: Value) -> Result<HttpReply> {
        let url = self.url(endpoint)?;
        debug!(endpoint = %endpoint, url = %url, "Submitting request");

        let response = self
            .http_client
            .post(url)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = parse_body(&bytes)?;

        debug!(endpoint = %endpoint, status, "Received reply");
        Ok(HttpReply { status, body })
    }
}

/// Parse a response body. A body that is not JSON is a transport failure
/// on every status, for reads and submissions alike.
fn parse_body(bytes: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Map a read response to its model, or to [`Error::Api`] when the status
/// is not 2xx.
fn decode_read<T: DeserializeOwned>(status: u16, bytes: &[u8]) -> Result<T> {
    let body = parse_body(bytes)?;
    if !(200..300).contains(&status) {
        return Err(Error::Api {
            message: detail_message(&body).unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            status: Some(status),
        });
    }
    Ok(serde_json::from_value(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client(base_url: &str) -> DeskClient {
        let mut config = Config::test_config();
        config.api.base_url = base_url.to_string();
        DeskClient::new(&config.api).unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let client = client("http://localhost:8000");
        assert_eq!(
            client.url(Endpoint::TradeOrder).unwrap().as_str(),
            "http://localhost:8000/trade_order"
        );
        assert_eq!(
            client.url(Endpoint::DashboardStats).unwrap().as_str(),
            "http://localhost:8000/dashboard_stats"
        );
    }

    #[test]
    fn test_base_path_is_kept() {
        let client = client("https://desk.example.com/api");
        assert_eq!(
            client.url(Endpoint::ModifyPositions).unwrap().as_str(),
            "https://desk.example.com/api/modify_positions"
        );
    }

    #[test]
    fn test_session_id_is_escaped() {
        let client = client("http://localhost:8000");
        assert_eq!(
            client.session_url("trade 1/2").unwrap().as_str(),
            "http://localhost:8000/sessions/trade%201%2F2"
        );
    }

    #[test]
    fn test_position_query() {
        let client = client("http://localhost:8000");
        assert_eq!(
            client.position_url(55, 273162078).unwrap().as_str(),
            "http://localhost:8000/position_details?ticket=55&account=273162078"
        );
    }

    #[test]
    fn test_decode_read_error_statuses() {
        let err = decode_read::<HealthStatus>(404, br#"{"detail": "Session not found"}"#).unwrap_err();
        assert!(matches!(
            err,
            Error::Api { ref message, status: Some(404) } if message == "Session not found"
        ));

        let err = decode_read::<HealthStatus>(500, b"{}").unwrap_err();
        assert!(matches!(
            err,
            Error::Api { ref message, status: Some(500) } if message == UNKNOWN_ERROR
        ));

        let err = decode_read::<HealthStatus>(502, b"<html>Bad Gateway</html>").unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_decode_read_success() {
        let status: HealthStatus =
            decode_read(200, br#"{"status": "healthy", "timestamp": 1700000000.5}"#).unwrap();
        assert!(status.is_healthy());

        // Valid JSON of the wrong shape is a body error, not a backend refusal
        let err = decode_read::<HealthStatus>(200, b"[]").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    /// Serve one canned HTTP response on a local port.
    async fn serve_once(status_line: &'static str, content_type: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
                    let length = head
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                content_type,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_read_error_detail_becomes_api_error() {
        let base = serve_once("404 Not Found", "application/json", r#"{"detail": "Session not found"}"#).await;
        let err = client(&base).session("trade_missing").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Api { ref message, status: Some(404) } if message == "Session not found"
        ));
    }

    #[tokio::test]
    async fn test_read_error_without_detail_is_unknown() {
        let base = serve_once("500 Internal Server Error", "application/json", "{}").await;
        let err = client(&base).dashboard_stats().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Api { ref message, status: Some(500) } if message == UNKNOWN_ERROR
        ));
    }

    #[tokio::test]
    async fn test_html_error_page_is_transport_on_both_paths() {
        let page = "<html><body>502 Bad Gateway</body></html>";

        let base = serve_once("502 Bad Gateway", "text/html", page).await;
        let read = client(&base).active_sessions().await.unwrap_err();
        assert!(read.is_transport());

        let base = serve_once("502 Bad Gateway", "text/html", page).await;
        let submit = client(&base)
            .post_json(Endpoint::ClosePositions, serde_json::json!({"session_id": "trade_1"}))
            .await
            .unwrap_err();
        assert!(submit.is_transport());
    }

    #[tokio::test]
    async fn test_post_returns_error_replies_as_data() {
        let base = serve_once("404 Not Found", "application/json", r#"{"detail": "Session not found"}"#).await;
        let reply = client(&base)
            .post_json(Endpoint::ClosePositions, serde_json::json!({"session_id": "trade_1"}))
            .await
            .unwrap();
        assert_eq!(reply.status, 404);
        assert_eq!(reply.body["detail"], "Session not found");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Nothing listens on port 1
        let client = client("http://127.0.0.1:1");
        let err = client
            .post_json(Endpoint::ClosePositions, serde_json::json!({"session_id": "x"}))
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
