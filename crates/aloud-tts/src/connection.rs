//! Upstream channel lifecycle — handshake and the shared single-slot cache.

use tokio::net::TcpStream;
use tokio::sync::{Mutex, MutexGuard};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use aloud_core::error::{AloudError, Result};

use crate::protocol;

pub type WsChannel = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Single-slot cache for the shared upstream channel.
///
/// The slot mutex is held for the duration of a synthesis turn. That gives
/// two guarantees at once: at most one handshake runs even when N callers
/// acquire concurrently (late callers wait on the lock and find the slot
/// filled), and turns are serialized on the shared channel — the remote
/// protocol is turn-based and cannot demultiplex interleaved requests.
pub struct ChannelSlot {
    slot: Mutex<Option<WsChannel>>,
    endpoint: String,
}

impl ChannelSlot {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(None),
            endpoint: endpoint.into(),
        }
    }

    /// Lock the slot, connecting first if no live channel is cached.
    ///
    /// The caller holds the channel exclusively until the guard drops. On
    /// channel close or error the caller must clear the slot so the next
    /// acquisition re-handshakes; an invalidated channel is never reused.
    pub async fn acquire(&self) -> Result<MutexGuard<'_, Option<WsChannel>>> {
        let mut guard = self.slot.lock().await;
        if guard.is_none() {
            *guard = Some(connect(&self.endpoint).await?);
        }
        Ok(guard)
    }
}

/// Perform the upgrade handshake with the fixed header set and a fresh
/// per-attempt `ConnectionId`.
async fn connect(endpoint: &str) -> Result<WsChannel> {
    let sep = if endpoint.contains('?') { '&' } else { '?' };
    let url = format!("{endpoint}{sep}ConnectionId={}", protocol::connect_id());

    let mut request = url
        .into_client_request()
        .map_err(|e| AloudError::Connection(format!("invalid endpoint URL: {e}")))?;

    let headers = request.headers_mut();
    headers.insert("Pragma", HeaderValue::from_static("no-cache"));
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Origin", HeaderValue::from_static(protocol::ORIGIN));
    headers.insert(
        "Accept-Encoding",
        HeaderValue::from_static("gzip, deflate, br"),
    );
    headers.insert(
        "Accept-Language",
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert("User-Agent", HeaderValue::from_static(protocol::USER_AGENT));

    let (ws, _response) = connect_async(request)
        .await
        .map_err(|e| AloudError::Connection(format!("upgrade handshake failed: {e}")))?;

    debug!(endpoint, "Upstream channel established");
    Ok(ws)
}
