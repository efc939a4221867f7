use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    pub product_id: u64,
    pub processed: usize,
    pub total: usize,
    /// Relationships accepted for this product; zero when its round failed.
    pub relationships_found: usize,
}

/// Receives a report after every batch item, whether it succeeded or not.
#[async_trait::async_trait]
pub trait ProgressObserver: Send + Sync {
    async fn on_progress(&self, progress: &BatchProgress);
}

#[async_trait::async_trait]
impl<F> ProgressObserver for F
where
    F: Fn(&BatchProgress) + Send + Sync,
{
    async fn on_progress(&self, progress: &BatchProgress) {
        self(progress)
    }
}

/// Forwards progress into a Tokio channel.
pub struct ChannelProgress {
    sender: mpsc::Sender<BatchProgress>,
}

impl ChannelProgress {
    pub fn new(sender: mpsc::Sender<BatchProgress>) -> Self {
        Self { sender }
    }

    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<BatchProgress>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self::new(sender), receiver)
    }
}

#[async_trait::async_trait]
impl ProgressObserver for ChannelProgress {
    async fn on_progress(&self, progress: &BatchProgress) {
        // A dropped receiver only means nobody is watching anymore.
        if self.sender.send(progress.clone()).await.is_err() {
            debug!(product_id = progress.product_id, "progress receiver closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn sample(processed: usize) -> BatchProgress {
        BatchProgress {
            product_id: processed as u64,
            processed,
            total: 3,
            relationships_found: 1,
        }
    }

    #[tokio::test]
    async fn test_closure_observer() {
        let seen = Mutex::new(Vec::new());
        let observer = |p: &BatchProgress| seen.lock().unwrap().push(p.processed);
        observer.on_progress(&sample(1)).await;
        observer.on_progress(&sample(2)).await;
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_channel_observer_forwards_and_tolerates_closed_receiver() {
        let (observer, mut rx) = ChannelProgress::channel(4);
        observer.on_progress(&sample(1)).await;
        assert_eq!(rx.recv().await, Some(sample(1)));

        drop(rx);
        observer.on_progress(&sample(2)).await;
    }
}
