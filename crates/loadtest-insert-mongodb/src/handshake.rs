//! Detection of TLS handshakes the cluster's certificate cannot pass.
//!
//! The driver treats a failed handshake like any other unreachable server
//! and keeps retrying until server selection gives up. A certificate that
//! the CA bundle does not verify will never start passing, so the session
//! watches the driver's heartbeat events and fails the ping as soon as one
//! of them reports such a rejection.

use mongodb::error::{Error, ErrorKind};
use mongodb::event::sdam::SdamEvent;
use mongodb::event::EventHandler;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Latest certificate rejection seen by one client's server monitors.
#[derive(Debug, Clone)]
pub struct HandshakeWatch {
    rejection: Arc<watch::Sender<Option<String>>>,
}

impl Default for HandshakeWatch {
    fn default() -> Self {
        Self::new()
    }
}

impl HandshakeWatch {
    pub fn new() -> Self {
        let (rejection, _) = watch::channel(None);
        Self {
            rejection: Arc::new(rejection),
        }
    }

    /// Handler to install as the client's `sdam_event_handler`.
    pub fn event_handler(&self) -> EventHandler<SdamEvent> {
        let rejection = Arc::clone(&self.rejection);
        EventHandler::callback(move |event: SdamEvent| {
            if let SdamEvent::ServerHeartbeatFailed(failed) = event {
                if let Some(reason) = certificate_rejection(&failed.failure) {
                    debug!("TLS handshake with {} rejected: {}", failed.server_address, reason);
                    rejection.send_replace(Some(format!("{}: {}", failed.server_address, reason)));
                }
            }
        })
    }

    /// Record a rejection directly, as a heartbeat failure would.
    pub fn reject(&self, reason: impl Into<String>) {
        self.rejection.send_replace(Some(reason.into()));
    }

    /// Resolves with the rejection once one has been seen. Never resolves
    /// for a server whose certificate verifies.
    pub async fn rejected(&self) -> String {
        let mut receiver = self.rejection.subscribe();
        let reason = receiver
            .wait_for(Option::is_some)
            .await
            .map(|reason| reason.as_deref().unwrap_or_default().to_string());
        match reason {
            Ok(reason) => reason,
            // The sender lives in `self`, so the channel cannot close here.
            Err(_) => std::future::pending().await,
        }
    }
}

/// The reason a driver error is a certificate rejection, if it is one.
///
/// Refused or timed-out connections return `None`: those may still recover
/// before the connect deadline.
pub fn certificate_rejection(error: &Error) -> Option<String> {
    if let ErrorKind::Io(io) = error.kind.as_ref() {
        if let Some(tls) = io
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<rustls::Error>())
        {
            return match tls {
                rustls::Error::InvalidCertificate(_) | rustls::Error::NoCertificatesPresented => {
                    Some(tls.to_string())
                }
                _ => None,
            };
        }
    }
    mentions_certificate(&error.to_string())
}

/// Fallback for errors that only carry the handshake failure as text, such
/// as a server selection timeout that lists each server's last error.
pub fn mentions_certificate(message: &str) -> Option<String> {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("invalid peer certificate") || lowered.contains("certificate verify failed")
    {
        Some(message.to_string())
    } else {
        None
    }
}
