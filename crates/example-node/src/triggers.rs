//! Trigger sources standing in for the hardware button.
//!
//! Each source runs as its own task and only pushes [`NodeEvent`]s into the
//! node's bounded channel.  A source ends when the node hangs up, when it
//! runs dry, or on shutdown.

use std::time::Duration;

use rd_node_sdk::NodeEvent;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::resources::PressCounter;

/// Record a press and hand it to the node.  Returns `false` once the node
/// is gone.
async fn press(tx: &mpsc::Sender<NodeEvent>, presses: &PressCounter, source: &str) -> bool {
    let total = presses.record();
    tracing::debug!(source, total, "button pressed");
    tx.send(NodeEvent::ButtonPressed).await.is_ok()
}

/// Every line read from `reader` is a press.
pub async fn pump_lines<R>(
    reader: R,
    tx: mpsc::Sender<NodeEvent>,
    presses: PressCounter,
    shutdown: CancellationToken,
) where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        let line = tokio::select! {
            l = lines.next_line() => l,
            _ = shutdown.cancelled() => return,
        };
        match line {
            Ok(Some(_)) => {
                if !press(&tx, &presses, "stdin").await {
                    return;
                }
            }
            Ok(None) => {
                tracing::debug!("stdin closed, no more presses");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed");
                return;
            }
        }
    }
}

/// Press on every line typed on stdin.
pub fn spawn_stdin(
    tx: mpsc::Sender<NodeEvent>,
    presses: PressCounter,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(pump_lines(
        BufReader::new(tokio::io::stdin()),
        tx,
        presses,
        shutdown,
    ))
}

/// Press every `period`, starting one period from now.
pub fn spawn_interval(
    period: Duration,
    tx: mpsc::Sender<NodeEvent>,
    presses: PressCounter,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if !press(&tx, &presses, "interval").await {
                        return;
                    }
                }
                _ = shutdown.cancelled() => return,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn each_line_is_one_press() {
        let (tx, mut rx) = mpsc::channel(8);
        let presses = PressCounter::default();
        let input: &[u8] = b"\nfoo\n\n";

        pump_lines(input, tx, presses.clone(), CancellationToken::new()).await;

        let mut got = 0;
        while let Some(ev) = rx.recv().await {
            assert_eq!(ev, NodeEvent::ButtonPressed);
            got += 1;
        }
        assert_eq!(got, 3);
        assert_eq!(presses.get(), 3);
    }

    #[tokio::test]
    async fn stops_when_node_hangs_up() {
        let (tx, rx) = mpsc::channel(8);
        drop(rx);
        let presses = PressCounter::default();
        let input: &[u8] = b"a\nb\nc\n";
        pump_lines(input, tx, presses.clone(), CancellationToken::new()).await;
        assert_eq!(presses.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_presses_periodically() {
        let (tx, mut rx) = mpsc::channel(8);
        let presses = PressCounter::default();
        let shutdown = CancellationToken::new();
        let handle = spawn_interval(Duration::from_secs(10), tx, presses.clone(), shutdown.clone());

        assert_eq!(rx.recv().await, Some(NodeEvent::ButtonPressed));
        assert_eq!(rx.recv().await, Some(NodeEvent::ButtonPressed));
        assert_eq!(presses.get(), 2);

        shutdown.cancel();
        handle.await.unwrap();
    }
}
