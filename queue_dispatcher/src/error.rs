/// Error taxonomy for the dispatcher crate, parallel to `geobroker::error::BrokerError`.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("consumer pool is empty")]
    EmptyPool,

    #[error("consumer rejected entry {seq}: {reason}")]
    ConsumerFailed { seq: u64, reason: String },

    #[error("dispatch timed out for entry {0}")]
    Timeout(u64),
}
