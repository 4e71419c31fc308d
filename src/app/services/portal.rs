use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::app::infrastructure::error::PortalError;

const TOKEN_FAILED_MESSAGE: &str = "Failed to generate token";
const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    discord_id: &'a str,
    username: &'a str,
}

/// Reply from `/api/generate-token`. Exactly one of the fields is normally
/// set; failures are folded into `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TokenResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyData {
    pub token: String,
    pub discord_id: String,
    pub username: String,
    pub display_name: String,
    pub avatar: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Blocking client for the verification portal backend.
#[derive(Debug, Clone)]
pub struct PortalClient {
    base: Url,
    timeout: Option<Duration>,
}

impl PortalClient {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, PortalError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| PortalError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn apply_timeout(&self, request: minreq::Request) -> minreq::Request {
        match self.timeout {
            Some(timeout) => request.with_timeout(timeout.as_secs().max(1)),
            None => request,
        }
    }

    /// Ask the backend for a verification token. Never fails: every problem
    /// comes back as `TokenResponse::error`.
    pub fn generate_token(&self, discord_id: &str, username: &str) -> TokenResponse {
        let url = match self.endpoint(&["api", "generate-token"]) {
            Ok(url) => url,
            Err(e) => {
                warn!("Cannot build token endpoint: {}", e);
                return TokenResponse::failure(UNAVAILABLE_MESSAGE);
            }
        };

        let body = TokenRequest {
            discord_id,
            username,
        };
        let request = match minreq::post(url.as_str()).with_json(&body) {
            Ok(request) => self.apply_timeout(request),
            Err(e) => {
                warn!("Failed to encode token request: {}", e);
                return TokenResponse::failure(UNAVAILABLE_MESSAGE);
            }
        };

        let response = match request.send() {
            Ok(response) => response,
            Err(e) => {
                warn!("Token request failed: {}", e);
                return TokenResponse::failure(UNAVAILABLE_MESSAGE);
            }
        };

        if !(200..300).contains(&response.status_code) {
            let message = response
                .json::<ErrorBody>()
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| TOKEN_FAILED_MESSAGE.to_string());
            return TokenResponse::failure(message);
        }

        match response.json::<TokenResponse>() {
            Ok(reply) => {
                info!(issued = reply.token.is_some(), "token request answered");
                reply
            }
            Err(e) => {
                warn!("Unreadable token response: {}", e);
                TokenResponse::failure(UNAVAILABLE_MESSAGE)
            }
        }
    }

    pub fn fetch_verify_data(&self, token: &str) -> Result<VerifyData, PortalError> {
        let url = self.endpoint(&["api", "verify", token])?;
        let response = self
            .apply_timeout(minreq::get(url.as_str()))
            .send()
            .map_err(|e| PortalError::Transport(e.to_string()))?;

        if !(200..300).contains(&response.status_code) {
            return Err(PortalError::Status(response.status_code));
        }

        let body: serde_json::Value = response
            .json()
            .map_err(|e| PortalError::Decode(e.to_string()))?;

        if let Some(error) = body.get("error") {
            let message = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(PortalError::Rejected(message));
        }

        serde_json::from_value(body).map_err(|e| PortalError::Decode(e.to_string()))
    }

    /// Where the browser goes to start Discord OAuth for `token`.
    pub fn oauth2_start_url(&self, token: &str) -> Result<String, PortalError> {
        let mut url = self.endpoint(&["oauth2", "start", ""])?;
        url.query_pairs_mut().append_pair("token", token);
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Answer one request with `status_line` and a JSON `body`, reporting the
    /// raw request text back through the returned receiver.
    fn serve_json(
        status_line: &'static str,
        body: &'static str,
    ) -> (Url, mpsc::Receiver<String>, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 2048];
            loop {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
            }
            tx.send(String::from_utf8_lossy(&request).into_owned()).unwrap();
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        (Url::parse(&format!("http://{}", addr)).unwrap(), rx, handle)
    }

    fn closed_port_url() -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        Url::parse(&format!("http://{}", addr)).unwrap()
    }

    #[test]
    fn test_generate_token_success() {
        let (base, requests, server) = serve_json("200 OK", r#"{"token":"abc123"}"#);
        let reply = PortalClient::new(base).generate_token("42", "ferris");
        server.join().unwrap();

        assert_eq!(reply.token.as_deref(), Some("abc123"));
        assert!(reply.error.is_none());

        let request = requests.recv().unwrap();
        assert!(request.starts_with("POST /api/generate-token"));
        assert!(request.contains(r#""discordId":"42""#));
        assert!(request.contains(r#""username":"ferris""#));
    }

    #[test]
    fn test_generate_token_error_body() {
        let (base, _requests, server) =
            serve_json("400 Bad Request", r#"{"error":"Already verified"}"#);
        let reply = PortalClient::new(base).generate_token("42", "ferris");
        server.join().unwrap();

        assert_eq!(reply, TokenResponse::failure("Already verified"));
    }

    #[test]
    fn test_generate_token_error_without_message() {
        let (base, _requests, server) = serve_json("500 Internal Server Error", "{}");
        let reply = PortalClient::new(base).generate_token("42", "ferris");
        server.join().unwrap();

        assert_eq!(reply.error.as_deref(), Some(TOKEN_FAILED_MESSAGE));
    }

    #[test]
    fn test_generate_token_unreachable() {
        let reply = PortalClient::new(closed_port_url()).generate_token("42", "ferris");
        assert_eq!(reply.error.as_deref(), Some(UNAVAILABLE_MESSAGE));
        assert!(reply.token.is_none());
    }

    #[test]
    fn test_fetch_verify_data() {
        let (base, requests, server) = serve_json(
            "200 OK",
            r#"{"token":"t1","discordId":"42","username":"ferris","displayName":"Ferris","avatar":"a.png"}"#,
        );
        let data = PortalClient::new(base).fetch_verify_data("t1").unwrap();
        server.join().unwrap();

        assert_eq!(data.discord_id, "42");
        assert_eq!(data.display_name, "Ferris");
        assert!(requests.recv().unwrap().starts_with("GET /api/verify/t1"));
    }

    #[test]
    fn test_fetch_verify_data_rejected() {
        let (base, _requests, server) = serve_json("200 OK", r#"{"error":"Token expired"}"#);
        let result = PortalClient::new(base).fetch_verify_data("t1");
        server.join().unwrap();

        assert_eq!(result, Err(PortalError::Rejected("Token expired".to_string())));
    }

    #[test]
    fn test_fetch_verify_data_status() {
        let (base, _requests, server) = serve_json("404 Not Found", "{}");
        let result = PortalClient::new(base).fetch_verify_data("t1");
        server.join().unwrap();

        assert_eq!(result, Err(PortalError::Status(404)));
    }

    #[test]
    fn test_oauth2_start_url() {
        let client = PortalClient::new(Url::parse("https://janvi.jarvibeta.xyz").unwrap());
        assert_eq!(
            client.oauth2_start_url("abc").unwrap(),
            "https://janvi.jarvibeta.xyz/oauth2/start/?token=abc"
        );
    }
}
