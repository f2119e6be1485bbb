use super::HttpdError;

// This trait must be implemented so the HTTPd can export metrics.
// Collection may block, so it is run off the async workers.
pub trait Collector: Send + Sync {
    fn collect(&self) -> Result<Vec<u8>, HttpdError>;
}
