pub mod agents;
pub mod simulation;
pub mod system;

pub use agents::*;
pub use simulation::*;
pub use system::*;

use axum::http::StatusCode;

use crate::error::BullbearError;

/// Map a domain error to an HTTP status and message
pub(crate) fn error_response(e: BullbearError) -> (StatusCode, String) {
    let status = match &e {
        BullbearError::JobAlreadyRunning | BullbearError::ResetWhileRunning => {
            StatusCode::CONFLICT
        }
        BullbearError::Validation(_) | BullbearError::InvalidDateRange(_) => {
            StatusCode::BAD_REQUEST
        }
        BullbearError::JobNotFound(_)
        | BullbearError::TraderNotFound(_)
        | BullbearError::PriceUnavailable { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}
