//! The background signaling service that coordinates remote screen-share
//! connections.
//!
//! The service is a plain TCP accept loop running as a tokio task. It greets
//! every peer with a small JSON hello so clients can verify they reached the
//! right endpoint. The only contract the rest of the application relies on is
//! shutdown: `stop` requests the loop to wind down, and `wait_stopped` can
//! optionally block for a bounded time until the listener socket is released.
//! The service must never outlive application termination.

use std::net::SocketAddr;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Mutex;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::watch;

use super::error::CoreError;

const WELCOME_LINE: &str = "{\"type\":\"welcome\",\"service\":\"screenlink-signaling\"}\n";

/// Handle to the running signaling accept loop.
pub struct SignalingServer {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    done: Mutex<Option<std::sync::mpsc::Receiver<()>>>,
}

impl SignalingServer {
    /// Binds the listener on localhost and spawns the accept loop.
    ///
    /// Pass port `0` to let the OS pick a free port (used by tests).
    pub async fn bind(port: u16) -> Result<Self, CoreError> {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CoreError::Bind(e, addr))?;
        let local_addr = listener.local_addr()?;

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        // A std channel so the event thread can wait without a runtime handle.
        let (done_tx, done_rx) = std::sync::mpsc::channel();

        tokio::spawn(async move {
            tracing::info!(%local_addr, "signaling service listening");
            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    accepted = listener.accept() => match accepted {
                        Ok((mut stream, peer)) => {
                            tracing::debug!(%peer, "signaling peer connected");
                            tokio::spawn(async move {
                                if let Err(e) = stream.write_all(WELCOME_LINE.as_bytes()).await {
                                    tracing::debug!(%peer, "failed to greet signaling peer: {}", e);
                                }
                            });
                        }
                        Err(e) => tracing::warn!("signaling accept failed: {}", e),
                    }
                }
            }
            tracing::info!("signaling service stopped");
            let _ = done_tx.send(());
        });

        Ok(Self {
            local_addr,
            shutdown,
            done: Mutex::new(Some(done_rx)),
        })
    }

    /// The address the listener actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Requests the accept loop to stop. Returns immediately; the loop winds
    /// down on its own and releases the listener socket.
    pub fn stop(&self) {
        if self.shutdown.send(true).is_err() {
            tracing::debug!("signaling service already stopped");
        }
    }

    /// Blocks until the accept loop has exited, or until `timeout` elapses.
    /// Returns `true` once the service is known to be down.
    pub fn wait_stopped(&self, timeout: Duration) -> bool {
        let receiver = self
            .done
            .lock()
            .expect("Mutex was poisoned. This should not happen.")
            .take();
        match receiver {
            Some(rx) => match rx.recv_timeout(timeout) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!("signaling service did not stop within {:?}", timeout);
                    false
                }
            },
            // A previous wait already confirmed shutdown.
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_helpers::setup_test_logging;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn greets_connecting_peers() {
        setup_test_logging();
        let server = SignalingServer::bind(0).await.expect("bind failed");

        let mut stream = TcpStream::connect(server.local_addr())
            .await
            .expect("connect failed");
        let mut greeting = String::new();
        stream
            .read_to_string(&mut greeting)
            .await
            .expect("read failed");

        assert!(greeting.contains("screenlink-signaling"));
    }

    #[tokio::test]
    async fn stop_releases_the_listener() {
        setup_test_logging();
        let server = SignalingServer::bind(0).await.expect("bind failed");
        let addr = server.local_addr();

        server.stop();
        let stopped =
            tokio::task::spawn_blocking(move || server.wait_stopped(Duration::from_secs(2)))
                .await
                .expect("join failed");
        assert!(stopped, "accept loop should exit after stop");

        assert!(
            TcpStream::connect(addr).await.is_err(),
            "listener port should be closed after shutdown"
        );
    }

    #[tokio::test]
    async fn wait_stopped_is_idempotent() {
        setup_test_logging();
        let server = SignalingServer::bind(0).await.expect("bind failed");
        server.stop();

        let (first, second) = tokio::task::spawn_blocking(move || {
            (
                server.wait_stopped(Duration::from_secs(2)),
                server.wait_stopped(Duration::from_millis(10)),
            )
        })
        .await
        .expect("join failed");

        assert!(first);
        assert!(second, "a second wait reports the already-confirmed shutdown");
    }
}
