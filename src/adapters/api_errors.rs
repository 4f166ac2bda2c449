use crate::domain::error::PaymentError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Newtype over the domain error so the HTTP mapping lives in the
/// adapter layer, not in the domain.
pub struct ApiError(pub PaymentError);

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self.0 {
            PaymentError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                msg.clone(),
            ),
            PaymentError::SignatureInvalid => (
                StatusCode::BAD_REQUEST,
                "signature_invalid",
                "invalid signature".to_string(),
            ),
            PaymentError::IllegalTransition { from, to } => (
                StatusCode::CONFLICT,
                "illegal_transition",
                format!("cannot move payment from {from} to {to}"),
            ),
            PaymentError::GatewayUnavailable(err) => {
                tracing::error!("gateway unavailable: {err}");
                (
                    StatusCode::BAD_GATEWAY,
                    "gateway_unavailable",
                    "payment gateway unavailable".to_string(),
                )
            }
            PaymentError::BookingUpdateFailed(err) => {
                tracing::error!("booking update failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "booking_update_failed",
                    "internal error".to_string(),
                )
            }
            PaymentError::NotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                "payment not found".to_string(),
            ),
            PaymentError::Database(err) => {
                tracing::error!("database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
            PaymentError::Serialization(err) => {
                tracing::error!("serialization error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error_code": error_code,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
