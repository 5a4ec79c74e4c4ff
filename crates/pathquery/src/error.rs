use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Parse error in '{expr}' at position {position}: {message}")]
    Parse {
        expr: String,
        position: usize,
        message: String,
    },

    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    #[error("Unknown axis '{0}'")]
    UnknownAxis(String),

    #[error("Unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),
}
