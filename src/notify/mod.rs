//! Delivery notifications
//!
//! The processor appends events to the queue file through the `producer`; the
//! `relay` daemon consumes that file and republishes unsent events to the
//! outbound file, and `status` serves the relay's HTTP status route.

pub mod producer;
pub mod relay;
pub mod status;

pub use producer::{QueueProducer, render_delivery_message};
pub use relay::{PollReport, Relay, RelayConfig, RelayCursor};
pub use status::{StatusResponse, status_router};

use std::net::SocketAddr;

use tokio::sync::watch;

use crate::error::Result;

/// Run the relay loop and its status server until `shutdown` flips to true.
///
/// The status listener is bound before the relay starts; if either side fails
/// the other is dropped and the error is returned.
pub async fn run_with_status(relay: Relay, addr: SocketAddr, shutdown: watch::Receiver<bool>) -> Result<()> {
    let listener = status::bind(addr).await?;
    let outbound_path = relay.config().outbound_path.clone();

    tokio::try_join!(
        relay.run(shutdown.clone()),
        status::serve_on(listener, outbound_path, shutdown)
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::net::TcpListener;

    fn relay(temp: &TempDir) -> Relay {
        Relay::new(RelayConfig {
            queue_path: temp.path().join("queue.jsonl"),
            outbound_path: temp.path().join("outbound.jsonl"),
            cursor_path: temp.path().join("cursor.json"),
            recipient: "@ops".to_string(),
            poll_interval: Duration::from_millis(20),
        })
    }

    #[tokio::test]
    async fn test_port_in_use_fails_immediately() {
        let temp = TempDir::new().unwrap();
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();
        let (_tx, rx) = watch::channel(false);

        let result = tokio::time::timeout(Duration::from_secs(2), run_with_status(relay(&temp), addr, rx))
            .await
            .expect("bind failure should end the daemon without a shutdown signal");

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to bind"));
        assert!(!temp.path().join("cursor.json").exists());
    }

    #[tokio::test]
    async fn test_relay_and_status_stop_together() {
        let temp = TempDir::new().unwrap();
        let (tx, rx) = watch::channel(false);
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();

        let handle = tokio::spawn(run_with_status(relay(&temp), addr, rx));
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap().unwrap();
    }
}
