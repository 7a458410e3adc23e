use thiserror::Error;

/// Fatal evaluation errors. There is no user-level exception mechanism:
/// every variant aborts the current run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },
    #[error("Unknown field '{field}'")]
    UnknownField { field: String },
    #[error("Expected a class instance, got {type_name}")]
    NotAnInstance { type_name: &'static str },
    #[error("Unknown method '{method}' for class {class}")]
    UnknownMethod { method: String, class: String },
    #[error("Method '{method}' expected {expected} arguments, got {found}")]
    MethodArityMismatch {
        method: String,
        expected: usize,
        found: usize,
    },
    #[error("Operation '{operation}' is not supported for type {type_name}")]
    UnsupportedOperation {
        operation: &'static str,
        type_name: &'static str,
    },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Arithmetic overflow in '{operation}'")]
    ArithmeticOverflow { operation: &'static str },
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
