//! Shared reqwest helpers for the HTTP adapters.

use reqwest::Response;
use serde_json::Value;
use storm_application::TransportError;
use storm_domain::core::text::truncate;

/// Longest error body kept in a [`TransportError::Status`].
const MAX_ERROR_BODY: usize = 500;

/// Map a reqwest failure onto the transport error taxonomy.
pub(crate) fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_decode() {
        TransportError::Decode(err.to_string())
    } else {
        TransportError::Connect(err.to_string())
    }
}

/// Turn a non-success response into [`TransportError::Status`].
pub(crate) async fn ensure_success(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Status {
        status: status.as_u16(),
        body: truncate(body.trim(), MAX_ERROR_BODY),
    })
}

/// Check the status and decode the body as JSON.
///
/// A body cut off by a timeout or a dropped connection is transient; only a
/// body that arrived whole but is not JSON is a [`TransportError::Decode`].
pub(crate) async fn read_json(response: Response) -> Result<Value, TransportError> {
    let response = ensure_success(response).await?;
    let body = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Connect(format!("failed to read response body: {}", e))
        }
    })?;
    serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return its URL.
    async fn serve_once(raw: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket.write_all(raw.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn fetch(raw: &'static str) -> Result<Value, TransportError> {
        let url = serve_once(raw).await;
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let response = client.get(&url).send().await.map_err(classify)?;
        read_json(response).await
    }

    #[tokio::test]
    async fn test_truncated_body_is_transient() {
        let err = fetch(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"partial\"",
        )
        .await
        .unwrap_err();

        assert!(err.is_transient(), "got {err:?}");
    }

    #[tokio::test]
    async fn test_malformed_json_is_decode() {
        let err = fetch(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 8\r\nConnection: close\r\n\r\nnot json",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, TransportError::Decode(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_error_status_keeps_body() {
        let err = fetch(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 4\r\nConnection: close\r\n\r\nbusy",
        )
        .await
        .unwrap_err();

        assert_eq!(
            err,
            TransportError::Status {
                status: 503,
                body: "busy".to_string()
            }
        );
    }
}
