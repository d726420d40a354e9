use crate::node::NodeId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("The document is being captured and cannot be modified")]
    CaptureInProgress,

    #[error("No node with id {0:?} in this document")]
    UnknownNode(NodeId),

    #[error("Invalid document description: {0}")]
    InvalidSpec(String),
}

impl From<serde_json::Error> for SurfaceError {
    fn from(e: serde_json::Error) -> Self {
        SurfaceError::InvalidSpec(e.to_string())
    }
}
