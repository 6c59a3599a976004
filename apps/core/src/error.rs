use thiserror::Error;

#[derive(Debug, Error)]
pub enum DojoError {
    #[error("invalid type: {0}")]
    UnrecognizedType(String),

    #[error("failed to parse {resource}: {source}")]
    Parse {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid transition from {from} with event {event}")]
    Transition { from: String, event: String },
}
