//! Client for the backend's local control API.
//!
//! Every command is a bodiless JSON POST. Calls are at-most-once: nothing
//! here retries, and failures are reported to the caller (or logged, for
//! fire-and-forget dispatch) rather than raised.

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ShellError, ShellResult, CONTROL_REQUEST_TIMEOUT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ControlCommand {
    Start,
    Stop,
    Restart,
    Update,
    Rotate,
}

impl ControlCommand {
    pub(crate) const ALL: [Self; 5] = [
        Self::Start,
        Self::Stop,
        Self::Restart,
        Self::Update,
        Self::Rotate,
    ];

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Update => "update",
            Self::Rotate => "rotate",
        }
    }

    /// Path below `/api/`.
    pub(crate) fn endpoint_path(self) -> &'static str {
        match self {
            Self::Start => "all/start",
            Self::Stop => "all/stop",
            Self::Restart => "restart",
            Self::Update => "update",
            Self::Rotate => "rotate",
        }
    }

    pub(crate) fn from_name(raw: &str) -> Option<Self> {
        let name = raw.trim();
        Self::ALL
            .into_iter()
            .find(|command| command.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct InstanceResult {
    #[serde(default)]
    pub(crate) instance: String,
    #[serde(default)]
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) message: Option<String>,
}

/// Body shape returned by the NKAS web UI for control routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ControlResponseBody {
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) results: Vec<InstanceResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ControlOutcome {
    pub(crate) ok: bool,
    pub(crate) status: u16,
    pub(crate) body: ControlResponseBody,
}

#[derive(Debug, Clone)]
pub(crate) struct ControlClient {
    http: reqwest::Client,
    api_base: Url,
}

impl ControlClient {
    pub(crate) fn new(base_url: &str) -> ShellResult<Self> {
        let api_base = api_base_url(base_url).map_err(|reason| {
            ShellError::ControlCommandFailure {
                command: "init",
                reason,
            }
        })?;
        let http = reqwest::Client::builder()
            .timeout(CONTROL_REQUEST_TIMEOUT)
            .no_proxy()
            .build()
            .map_err(|error| ShellError::ControlCommandFailure {
                command: "init",
                reason: format!("failed to build HTTP client: {error}"),
            })?;
        Ok(Self { http, api_base })
    }

    pub(crate) fn endpoint(&self, command: ControlCommand) -> ShellResult<Url> {
        self.api_base
            .join(command.endpoint_path())
            .map_err(|error| ShellError::ControlCommandFailure {
                command: command.name(),
                reason: format!("invalid endpoint: {error}"),
            })
    }

    pub(crate) async fn send(&self, command: ControlCommand) -> ShellResult<ControlOutcome> {
        let endpoint = self.endpoint(command)?;
        let failure = |reason: String| ShellError::ControlCommandFailure {
            command: command.name(),
            reason,
        };

        let response = self
            .http
            .post(endpoint)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(|error| failure(format!("request failed: {error}")))?;
        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|error| failure(format!("failed to read response body: {error}")))?;
        let body = parse_response_body(&raw)
            .map_err(|error| failure(format!("unparsable response (HTTP {status}): {error}")))?;

        Ok(ControlOutcome {
            ok: status.is_success(),
            status: status.as_u16(),
            body,
        })
    }

    /// Sends `command` on the async runtime and logs the outcome.
    pub(crate) fn dispatch(&self, command: ControlCommand) {
        let client = self.clone();
        tauri::async_runtime::spawn(async move {
            log_outcome(command, &client.send(command).await);
        });
    }
}

fn api_base_url(base_url: &str) -> Result<Url, String> {
    let mut parsed = Url::parse(base_url.trim())
        .map_err(|error| format!("invalid control API base URL '{base_url}': {error}"))?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(format!("unsupported control API scheme '{scheme}'")),
    }
    let path = format!("{}/api/", parsed.path().trim_end_matches('/'));
    parsed.set_path(&path);
    Ok(parsed)
}

fn parse_response_body(raw: &str) -> Result<ControlResponseBody, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(ControlResponseBody::default());
    }
    serde_json::from_str(raw)
}

pub(crate) fn log_outcome(command: ControlCommand, result: &ShellResult<ControlOutcome>) {
    match result {
        Ok(outcome) if outcome.ok => tracing::info!(
            command = command.name(),
            status = outcome.status,
            message = outcome.body.message.as_deref().unwrap_or(""),
            "control command accepted"
        ),
        Ok(outcome) => tracing::warn!(
            command = command.name(),
            status = outcome.status,
            message = outcome.body.message.as_deref().unwrap_or(""),
            "control command rejected by backend"
        ),
        Err(error) => tracing::error!("{error}"),
    }
}

#[cfg(test)]
mod tests {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut buffer = vec![0_u8; 4096];
            let read = socket.read(&mut buffer).await.expect("read request");
            let request = String::from_utf8_lossy(&buffer[..read]).to_string();
            let response = format!(
                "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket
                .write_all(response.as_bytes())
                .await
                .expect("write response");
            socket.shutdown().await.ok();
            request
        });
        (base, handle)
    }

    #[test]
    fn commands_map_to_fixed_endpoints() {
        let client = ControlClient::new("http://127.0.0.1:22267").expect("client");
        let paths: Vec<String> = ControlCommand::ALL
            .into_iter()
            .map(|command| client.endpoint(command).expect("endpoint").to_string())
            .collect();
        assert_eq!(
            paths,
            vec![
                "http://127.0.0.1:22267/api/all/start",
                "http://127.0.0.1:22267/api/all/stop",
                "http://127.0.0.1:22267/api/restart",
                "http://127.0.0.1:22267/api/update",
                "http://127.0.0.1:22267/api/rotate",
            ]
        );
    }

    #[test]
    fn command_names_round_trip_case_insensitively() {
        assert_eq!(ControlCommand::from_name("Restart"), Some(ControlCommand::Restart));
        assert_eq!(ControlCommand::from_name(" rotate "), Some(ControlCommand::Rotate));
        assert_eq!(ControlCommand::from_name("reboot"), None);
    }

    #[test]
    fn base_url_must_be_http() {
        assert!(ControlClient::new("ftp://127.0.0.1:22267").is_err());
        assert!(ControlClient::new("not a url").is_err());
    }

    #[test]
    fn empty_body_parses_as_default() {
        assert_eq!(
            parse_response_body("  ").expect("empty body"),
            ControlResponseBody::default()
        );
        assert!(parse_response_body("<html>").is_err());
    }

    #[tokio::test]
    async fn successful_command_posts_json_and_parses_body() {
        let (base, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"status":"success","results":[{"instance":"nkas","status":"success","message":"Instance \"nkas\" started."}]}"#,
        )
        .await;
        let client = ControlClient::new(&base).expect("client");

        let outcome = client.send(ControlCommand::Start).await.expect("outcome");
        assert!(outcome.ok);
        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.body.status.as_deref(), Some("success"));
        assert_eq!(outcome.body.results.len(), 1);
        assert_eq!(outcome.body.results[0].instance, "nkas");

        let request = server.await.expect("server task").to_ascii_lowercase();
        assert!(request.starts_with("post /api/all/start http/1.1"));
        assert!(request.contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn non_success_status_with_json_body_is_a_rejected_outcome() {
        let (base, _server) = serve_once(
            "HTTP/1.1 503 Service Unavailable",
            r#"{"status":"error","message":"Restart functionality is not enabled"}"#,
        )
        .await;
        let client = ControlClient::new(&base).expect("client");

        let outcome = client.send(ControlCommand::Restart).await.expect("outcome");
        assert!(!outcome.ok);
        assert_eq!(outcome.status, 503);
        assert_eq!(
            outcome.body.message.as_deref(),
            Some("Restart functionality is not enabled")
        );
    }

    #[tokio::test]
    async fn unparsable_body_is_a_failure() {
        let (base, _server) = serve_once("HTTP/1.1 404 Not Found", "Not Found").await;
        let client = ControlClient::new(&base).expect("client");

        let error = client
            .send(ControlCommand::Rotate)
            .await
            .expect_err("plain text body");
        assert!(matches!(
            error,
            ShellError::ControlCommandFailure {
                command: "rotate",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unreachable_backend_resolves_to_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("addr");
        drop(listener);

        let client = ControlClient::new(&format!("http://{address}")).expect("client");
        let result = client.send(ControlCommand::Stop).await;
        assert!(matches!(
            result,
            Err(ShellError::ControlCommandFailure { command: "stop", .. })
        ));
        log_outcome(ControlCommand::Stop, &result);
    }
}
