use drip_core::RecipientId;
use thiserror::Error;

/// Errors from the durable state layer.
///
/// `Io` and `Invalid` during startup load are fatal to the process;
/// during a mutation they abort that mutation and must not be swallowed —
/// the in-memory state is only trusted once the document hit disk.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: invalid document: {message}")]
    Invalid { path: String, message: String },

    #[error("unknown recipient: {0}")]
    UnknownRecipient(RecipientId),
}

pub type Result<T> = std::result::Result<T, StoreError>;
