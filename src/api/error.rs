use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};

use super::error_response;
use crate::error::{CalculationError, InputError};

pub const GENERIC_FAILURE: &str = "An error occurred while calculating the mortgage";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Calculation(#[from] CalculationError),
}

impl ApiError {
    /// What a user gets to see. Calculation failures stay generic; the
    /// detail goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Input(e) => e.to_string(),
            ApiError::Calculation(_) => GENERIC_FAILURE.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Input(e) => {
                debug!(error = %e, "rejected mortgage input");
                error_response(StatusCode::BAD_REQUEST, &e.to_string(), e.field())
            }
            ApiError::Calculation(e) => {
                error!(error = %e, "mortgage calculation failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE, None)
            }
        }
    }
}
