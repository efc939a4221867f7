pub mod batch;
pub mod progress;

pub use batch::{BatchOrchestrator, BatchSummary};
pub use progress::{BatchProgress, ChannelProgress, ProgressObserver};
