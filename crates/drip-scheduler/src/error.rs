use thiserror::Error;

/// Errors that abort a due-scan.
///
/// Today these are all persistence failures bubbling up from the store:
/// once a document write fails the tick must stop rather than keep
/// serving recipients from state that never reached disk.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("State persistence failed: {0}")]
    Store(#[from] drip_store::StoreError),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
