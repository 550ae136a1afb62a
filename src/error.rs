use thiserror::Error;

/// Rejections raised before the engine runs. Messages are shown to the user
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Missing form fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{message}")]
    InvalidField {
        field: &'static str,
        message: &'static str,
    },
}

impl InputError {
    pub fn field(&self) -> Option<&'static str> {
        match self {
            InputError::MissingFields(_) => None,
            InputError::InvalidField { field, .. } => Some(field),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    #[error("calculation produced a non-finite {figure}")]
    NonFinite { figure: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
