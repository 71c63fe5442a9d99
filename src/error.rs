use thiserror::Error;

use crate::resource::ResourceType;

#[derive(Error, Debug)]
pub enum CompileError {
    /// The requested action is structurally impossible for this resource type.
    #[error("unsupported operation on {resource_type}: {reason}")]
    UnsupportedOperation { resource_type: ResourceType, reason: String },

    /// The caller violated a calling contract of the compiler.
    #[error("invalid request shape: {reason}")]
    InvalidRequestShape { reason: String },

    /// An attribute was supplied that the resource's property schema does not declare.
    #[error("attribute `{0}` is not declared in the property schema")]
    UnknownAttribute(String),
}

impl CompileError {
    pub(crate) fn unsupported(resource_type: ResourceType, reason: impl Into<String>) -> Self {
        CompileError::UnsupportedOperation {
            resource_type,
            reason: reason.into(),
        }
    }

    pub(crate) fn bad_shape(reason: impl Into<String>) -> Self {
        CompileError::InvalidRequestShape { reason: reason.into() }
    }
}
