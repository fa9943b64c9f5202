//! Thin chat client: connects to the gateway with a token cookie, surfaces
//! decoded server frames, and reconnects after any unexpected close with a
//! fixed delay, indefinitely. Ping/pong is answered transparently so the
//! server's liveness supervisor keeps the session alive.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{StatusCode, header};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::warn;
use uuid::Uuid;

use parley_types::wire::{Attachment, ClientFrame, ServerFrame};

/// How long to wait before re-dialing after an unexpected close. Matches
/// what the reference web client has always done: fixed interval, no
/// backoff, no cap.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server refused the upgrade with 401; the token is bad and
    /// retrying cannot help.
    #[error("unauthorized")]
    Unauthorized,
    #[error("websocket error: {0}")]
    Ws(#[from] Box<WsError>),
    #[error("protocol error: {0}")]
    Protocol(String),
}

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection factory holding the gateway URL and the credential.
pub struct ChatClient {
    url: String,
    token: String,
}

impl ChatClient {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
        }
    }

    /// Open a single session.
    pub async fn connect(&self) -> Result<ChatConnection, ClientError> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(Box::new)?;
        request.headers_mut().insert(
            header::COOKIE,
            format!("token={}", self.token)
                .parse()
                .map_err(|_| ClientError::Protocol("token not header-safe".to_string()))?,
        );

        match connect_async(request).await {
            Ok((ws, _resp)) => Ok(ChatConnection { ws }),
            Err(WsError::Http(resp)) if resp.status() == StatusCode::UNAUTHORIZED => {
                Err(ClientError::Unauthorized)
            }
            Err(e) => Err(Box::new(e).into()),
        }
    }

    /// Run forever: connect, feed every frame to `on_frame`, and after any
    /// close or transport error wait [`RECONNECT_DELAY`] and dial again.
    /// Only a credential rejection ends the loop.
    pub async fn run<F>(&self, mut on_frame: F) -> Result<(), ClientError>
    where
        F: FnMut(ServerFrame),
    {
        loop {
            match self.connect().await {
                Ok(mut conn) => loop {
                    match conn.next().await {
                        Ok(Some(frame)) => on_frame(frame),
                        Ok(None) => {
                            warn!("connection closed, reconnecting");
                            break;
                        }
                        Err(ClientError::Unauthorized) => return Err(ClientError::Unauthorized),
                        Err(e) => {
                            warn!(error = %e, "connection lost, reconnecting");
                            break;
                        }
                    }
                },
                Err(ClientError::Unauthorized) => return Err(ClientError::Unauthorized),
                Err(e) => warn!(error = %e, "connect failed, retrying"),
            }

            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    }
}

/// One live session.
pub struct ChatConnection {
    ws: Ws,
}

impl ChatConnection {
    /// Send a message, optionally with an attachment.
    pub async fn send(
        &mut self,
        recipient: Uuid,
        text: impl Into<String>,
        file: Option<Attachment>,
    ) -> Result<(), ClientError> {
        let frame = ClientFrame {
            recipient: Some(recipient),
            text: Some(text.into()),
            file,
        };
        let json = serde_json::to_string(&frame)
            .map_err(|e| ClientError::Protocol(e.to_string()))?;
        self.ws
            .send(Message::Text(json.into()))
            .await
            .map_err(Box::new)?;
        Ok(())
    }

    /// Next server frame; `Ok(None)` on a clean close. Pings are answered
    /// inline and never surfaced.
    pub async fn next(&mut self) -> Result<Option<ServerFrame>, ClientError> {
        while let Some(msg) = self.ws.next().await {
            match msg.map_err(Box::new)? {
                Message::Text(text) => {
                    let frame = serde_json::from_str(text.as_str())
                        .map_err(|e| ClientError::Protocol(e.to_string()))?;
                    return Ok(Some(frame));
                }
                Message::Ping(payload) => {
                    self.ws.send(Message::Pong(payload)).await.map_err(Box::new)?;
                }
                Message::Close(_) => return Ok(None),
                _ => {}
            }
        }
        Ok(None)
    }

    /// Close the session cleanly.
    pub async fn close(&mut self) -> Result<(), ClientError> {
        self.ws.close(None).await.map_err(Box::new)?;
        Ok(())
    }
}
