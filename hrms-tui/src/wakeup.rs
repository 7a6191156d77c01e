//! Wakeup channel for the event loop.
//!
//! The loop sleeps until input arrives, an alert expires, or a background
//! task (a save, a refresh) signals here that shared state changed.

use tokio::sync::mpsc;

/// Cloneable sender, handed to background tasks.
#[derive(Clone, Debug)]
pub struct WakeupSender {
    tx: mpsc::Sender<()>,
}

impl WakeupSender {
    /// Non-blocking. A full buffer already guarantees a wakeup, and a
    /// dropped receiver means the loop has exited.
    pub fn send(&self) {
        let _ = self.tx.try_send(());
    }
}

pub struct WakeupReceiver {
    rx: mpsc::Receiver<()>,
}

impl WakeupReceiver {
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Discard queued signals so a burst collapses into one redraw.
    pub fn drain(&mut self) -> usize {
        let mut drained = 0;
        while self.rx.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }
}

pub fn channel() -> (WakeupSender, WakeupReceiver) {
    let (tx, rx) = mpsc::channel(16);
    (WakeupSender { tx }, WakeupReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_burst_collapses() {
        let (tx, mut rx) = channel();
        for _ in 0..40 {
            tx.clone().send();
        }
        assert_eq!(rx.recv().await, Some(()));
        assert_eq!(rx.drain(), 15);
        assert_eq!(rx.drain(), 0);
    }

    #[tokio::test]
    async fn test_closed_when_senders_dropped() {
        let (tx, mut rx) = channel();
        drop(tx);
        assert_eq!(rx.recv().await, None);
    }
}
