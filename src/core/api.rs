//! HTTP listing of pipelines from the execution server's REST API.
//!
//! Used for post-apply verification. Transport settings are an explicit
//! value handed to each client, so one run's `insecure` flag never leaks
//! into another client in the same process.

use reqwest::blocking::Client;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::request::Source;

/// Per-client transport settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportConfig {
    /// Accept any TLS certificate.
    pub insecure: bool,
}

impl TransportConfig {
    pub fn from_source(source: &Source) -> Self {
        Self {
            insecure: source.insecure,
        }
    }
}

/// A pipeline as reported by `GET /api/v1/teams/<team>/pipelines`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPipeline {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Source of truth for which pipelines exist on the server.
pub trait PipelineLister {
    fn pipelines(&self, team: &str) -> Result<Vec<ApiPipeline>>;
}

/// Blocking HTTP client for the pipeline listing endpoint.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    username: String,
    password: String,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        username: &str,
        password: &str,
        transport: TransportConfig,
    ) -> Result<Self> {
        if base_url.is_empty() {
            return Err(Error::validation_missing_argument("target"));
        }

        let parsed = Url::parse(base_url).map_err(|e| {
            Error::validation_invalid_argument("target", e.to_string(), Some(base_url.to_string()))
        })?;
        if parsed.cannot_be_a_base() {
            return Err(Error::validation_invalid_argument(
                "target",
                "must be an http(s) URL",
                Some(base_url.to_string()),
            ));
        }

        let client = Client::builder()
            .danger_accept_invalid_certs(transport.insecure)
            .build()
            .map_err(|e| Error::transport_request_failed(base_url, e.to_string()))?;

        Ok(Self {
            client,
            base_url: parsed,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn from_source(source: &Source) -> Result<Self> {
        Self::new(
            &source.target,
            &source.username,
            &source.password,
            TransportConfig::from_source(source),
        )
    }

    /// `<target>/api/v1/teams/<team>/pipelines`, with `team` encoded as one segment.
    fn pipelines_url(&self, team: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::validation_invalid_argument(
                    "target",
                    "must be an http(s) URL",
                    Some(self.base_url.to_string()),
                )
            })?
            .pop_if_empty()
            .extend(["api", "v1", "teams", team, "pipelines"]);
        Ok(url)
    }
}

impl PipelineLister for ApiClient {
    fn pipelines(&self, team: &str) -> Result<Vec<ApiPipeline>> {
        let url = self.pipelines_url(team)?;
        let mut request = self.client.get(url.clone());

        if !self.username.is_empty() && !self.password.is_empty() {
            request = request.basic_auth(&self.username, Some(&self.password));
        }

        log_status!("api", "GET {}", url);
        let response = request
            .send()
            .map_err(|e| Error::transport_request_failed(url.as_str(), e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| Error::transport_request_failed(url.as_str(), e.to_string()))?;

        decode_pipelines(url.as_str(), status, &body)
    }
}

fn decode_pipelines(url: &str, status: u16, body: &str) -> Result<Vec<ApiPipeline>> {
    if !(200..300).contains(&status) {
        return Err(Error::transport_bad_status(url, status, body));
    }

    serde_json::from_str(body).map_err(|e| {
        Error::internal_json(e.to_string(), Some(format!("decode pipelines from {}", url)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;

    const URL: &str = "https://ci/api/v1/teams/main/pipelines";

    #[test]
    fn decodes_ordered_name_url_pairs() {
        let body = r#"[
            {"name": "pipeline-1", "url": "/teams/main/pipelines/pipeline-1", "paused": false},
            {"name": "pipeline-2", "url": "/teams/main/pipelines/pipeline-2"}
        ]"#;
        let pipelines = decode_pipelines(URL, 200, body).unwrap();

        assert_eq!(pipelines.len(), 2);
        assert_eq!(pipelines[0].name, "pipeline-1");
        assert_eq!(pipelines[1].url, "/teams/main/pipelines/pipeline-2");
    }

    #[test]
    fn non_success_status_is_transport_error() {
        let err = decode_pipelines(URL, 401, "not authorized").unwrap_err();
        assert_eq!(err.code, ErrorCode::TransportBadStatus);
        assert_eq!(err.details["status"], 401);
    }

    #[test]
    fn malformed_body_is_json_error() {
        let err = decode_pipelines(URL, 200, "<html>").unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalJsonError);
    }

    #[test]
    fn client_requires_base_url() {
        let err = ApiClient::new("", "u", "p", TransportConfig::default())
            .err()
            .unwrap();
        assert_eq!(err.message, "target must be provided");
    }

    #[test]
    fn builds_team_scoped_url() {
        let client = ApiClient::new("https://ci/", "u", "p", TransportConfig { insecure: true })
            .unwrap();
        assert_eq!(
            client.pipelines_url("ops").unwrap().as_str(),
            "https://ci/api/v1/teams/ops/pipelines"
        );
    }

    #[test]
    fn team_is_encoded_as_one_segment() {
        let client = ApiClient::new("https://ci/prefix", "u", "p", TransportConfig::default())
            .unwrap();
        assert_eq!(
            client.pipelines_url("a/b?c").unwrap().as_str(),
            "https://ci/prefix/api/v1/teams/a%2Fb%3Fc/pipelines"
        );
    }

    #[test]
    fn client_rejects_unparseable_target() {
        let err = ApiClient::new("not a url", "u", "p", TransportConfig::default())
            .err()
            .unwrap();
        assert_eq!(err.code, ErrorCode::ValidationInvalidArgument);
        assert_eq!(err.details["field"], "target");
    }

    #[test]
    fn unreachable_server_is_request_failure() {
        let client = ApiClient::new("http://127.0.0.1:1", "u", "p", TransportConfig::default())
            .unwrap();
        let err = client.pipelines("main").unwrap_err();
        assert_eq!(err.code, ErrorCode::TransportRequestFailed);
    }

    /// Answer one HTTP request with `body`; the thread returns the request head.
    fn serve_once(body: &'static str) -> (String, std::thread::JoinHandle<String>) {
        use std::io::{BufRead, BufReader, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }

            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            )
            .unwrap();
            head
        });

        (base_url, handle)
    }

    #[test]
    fn lists_team_pipelines_with_basic_auth() {
        let (base_url, server) = serve_once(r#"[{"name": "a", "url": "/x"}]"#);
        let client = ApiClient::new(&base_url, "u", "p", TransportConfig::default()).unwrap();

        let pipelines = client.pipelines("ops").unwrap();
        let head = server.join().unwrap().to_lowercase();

        assert_eq!(
            pipelines,
            vec![ApiPipeline {
                name: "a".to_string(),
                url: "/x".to_string(),
            }]
        );
        assert!(head.starts_with("get /api/v1/teams/ops/pipelines http/1.1\r\n"), "{}", head);
        // base64("u:p")
        assert!(head.contains("authorization: basic dtpw\r\n"), "{}", head);
    }

    #[test]
    fn empty_password_sends_no_authorization() {
        let (base_url, server) = serve_once("[]");
        let client = ApiClient::new(&base_url, "u", "", TransportConfig::default()).unwrap();

        assert!(client.pipelines("main").unwrap().is_empty());
        let head = server.join().unwrap().to_lowercase();

        assert!(head.starts_with("get /api/v1/teams/main/pipelines "), "{}", head);
        assert!(!head.contains("authorization:"), "{}", head);
    }

    #[test]
    fn transport_follows_source_flag() {
        let source = Source {
            insecure: true,
            ..Source::default()
        };
        assert!(TransportConfig::from_source(&source).insecure);
    }
}
