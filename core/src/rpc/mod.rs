// core/src/rpc/mod.rs
pub mod message;

use crate::utils::config::HttpSettings;
use crate::utils::models::Cluster;
use anyhow::{Context, Result};
use message::{Response, TransportError};
use reqwest::Client;

/// Path of the batch submission endpoint on every cluster.
pub const SUBMIT_PATH: &str = "rawscheduler";

/// One POST of a JSON body to a cluster.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn post(
        &self,
        cluster: &Cluster,
        path: &str,
        body: &serde_json::Value,
    ) -> std::result::Result<Response, TransportError>;
}

/// HTTP transport. Each call is a single request; nothing is retried here.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout()?)
            .read_timeout(settings.read_timeout()?)
            .user_agent(format!("cs/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    async fn post(
        &self,
        cluster: &Cluster,
        path: &str,
        body: &serde_json::Value,
    ) -> std::result::Result<Response, TransportError> {
        let url = cluster.endpoint(path);
        log::info!("POST {} with body {}", url, body);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(classify_send)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| classify_reply(status, e))?;
        log::info!("Response from {}: {} {}", url, status, text);
        Ok(Response { status, text })
    }
}

/// Only a failure to connect, or a request that could not be built, proves
/// the batch never left. A connect timeout is also a connect error, so it is
/// checked before the read timeout.
fn classify_send(e: reqwest::Error) -> TransportError {
    log::error!("HTTP request failed: {:?}", e);
    if e.is_connect() || e.is_builder() {
        TransportError::Connect(e.to_string())
    } else if e.is_timeout() {
        TransportError::ReadTimeout(e.to_string())
    } else {
        TransportError::Interrupted(e.to_string())
    }
}

/// The status line arrived, so the server has seen the request.
fn classify_reply(status: u16, e: reqwest::Error) -> TransportError {
    log::error!("Failed to read {} reply body: {:?}", status, e);
    if e.is_timeout() {
        TransportError::ReadTimeout(e.to_string())
    } else {
        TransportError::Interrupted(format!("status {}: {}", status, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::Duration;

    fn settings(read_timeout: f64) -> HttpSettings {
        HttpSettings { connect_timeout: 1.0, read_timeout }
    }

    fn local(listener: &TcpListener) -> Cluster {
        let port = listener.local_addr().unwrap().port();
        Cluster::new("local", format!("http://127.0.0.1:{}", port))
    }

    /// Consumes one request so closing the socket does not reset it.
    fn read_request(stream: &TcpStream) {
        let mut reader = BufReader::new(stream);
        let mut length = 0;
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap_or(0) > 0 {
            if line == "\r\n" {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    length = value.trim().parse().unwrap_or(0);
                }
            }
            line.clear();
        }
        let mut body = vec![0; length];
        let _ = reader.read_exact(&mut body);
    }

    /// Serves one connection with `handler` on a background thread.
    fn serve<F>(handler: F) -> Cluster
    where
        F: FnOnce(TcpStream) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let cluster = local(&listener);
        thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                handler(stream);
            }
        });
        cluster
    }

    async fn post(cluster: &Cluster, read_timeout: f64) -> std::result::Result<Response, TransportError> {
        let transport = HttpTransport::new(&settings(read_timeout)).unwrap();
        transport.post(cluster, SUBMIT_PATH, &serde_json::json!({"jobs": []})).await
    }

    #[tokio::test]
    async fn test_refused_port_is_a_connect_error() {
        let cluster = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            local(&listener)
        };
        let result = post(&cluster, 5.0).await;
        assert!(matches!(result, Err(TransportError::Connect(_))), "{:?}", result);
    }

    #[tokio::test]
    async fn test_silent_server_is_a_read_timeout() {
        let cluster = serve(|stream| {
            read_request(&stream);
            thread::sleep(Duration::from_secs(3));
        });
        let result = post(&cluster, 0.5).await;
        assert!(matches!(result, Err(TransportError::ReadTimeout(_))), "{:?}", result);
    }

    #[tokio::test]
    async fn test_truncated_created_reply_is_interrupted() {
        let cluster = serve(|mut stream| {
            read_request(&stream);
            let _ = stream.write_all(
                b"HTTP/1.1 201 Created\r\nContent-Length: 200\r\n\r\n\"submitted jobs 0d2f6c5e-7a43",
            );
            let _ = stream.flush();
        });
        let result = post(&cluster, 5.0).await;
        assert!(matches!(result, Err(TransportError::Interrupted(_))), "{:?}", result);
    }

    #[tokio::test]
    async fn test_complete_reply_is_returned() {
        let cluster = serve(|mut stream| {
            read_request(&stream);
            let body = r#"{"error": "nope"}"#;
            let _ = write!(stream, "HTTP/1.1 400 Bad Request\r\nContent-Length: {}\r\n\r\n{}", body.len(), body);
        });
        let response = post(&cluster, 5.0).await.unwrap();
        assert_eq!(response, Response::new(400, r#"{"error": "nope"}"#));
    }
}
