// src/pipeline/connection.rs

//! Live event stream transport.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, header};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::error::{AppError, Result};
use crate::models::ApiConfig;
use crate::utils::http::auth_header_value;

/// An open, bidirectional text stream.
#[async_trait]
pub trait EventStream: Send {
    /// Send one text frame.
    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Next text frame. `None` once the peer closed the stream.
    async fn next_text(&mut self) -> Option<Result<String>>;

    /// Close the stream gracefully.
    async fn close(&mut self) -> Result<()>;
}

/// Opens new event streams.
#[async_trait]
pub trait Connector: Send + Sync {
    type Stream: EventStream;

    async fn connect(&self) -> Result<Self::Stream>;
}

/// Connector for the Mist WebSocket stream.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
    token: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(&config.stream_url, &config.token)
    }
}

#[async_trait]
impl Connector for WsConnector {
    type Stream = WsStream;

    async fn connect(&self) -> Result<WsStream> {
        let mut request = self.url.as_str().into_client_request()?;
        let auth = HeaderValue::from_str(&auth_header_value(&self.token))
            .map_err(|e| AppError::config(format!("api.token is not a valid header value: {e}")))?;
        request.headers_mut().insert(header::AUTHORIZATION, auth);

        let (inner, response) = connect_async(request).await?;
        log::info!("Connected to {} ({})", self.url, response.status());
        Ok(WsStream { inner })
    }
}

/// WebSocket-backed event stream.
pub struct WsStream {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl EventStream for WsStream {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.inner.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn next_text(&mut self) -> Option<Result<String>> {
        loop {
            match self.inner.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Close(frame)) => {
                    match frame {
                        Some(frame) => log::info!(
                            "Stream closed by server: code {}, reason '{}'",
                            u16::from(frame.code),
                            frame.reason
                        ),
                        None => log::info!("Stream closed by server"),
                    }
                    return None;
                }
                // Pings are answered by tungstenite on the next read.
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.inner.close(None).await?;
        Ok(())
    }
}
