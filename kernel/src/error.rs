use std::fmt::Display;

use error_stack::Context;

#[derive(Debug)]
pub enum KernelError {
    Validation,
    NullReference,
    State,
    Concurrency,
    NotFound,
    Timeout,
    Internal,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::Validation => write!(f, "Validation error"),
            KernelError::NullReference => write!(f, "Missing required reference"),
            KernelError::State => write!(f, "Invalid lifecycle state"),
            KernelError::Concurrency => write!(f, "Concurrency error"),
            KernelError::NotFound => write!(f, "Entity not found"),
            KernelError::Timeout => write!(f, "Process timed out"),
            KernelError::Internal => write!(f, "Internal kernel error"),
        }
    }
}

impl Context for KernelError {}
