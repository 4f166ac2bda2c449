use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{id::{OrderId, RefundId}, payment::PaymentStatus},
        services::refunds,
    },
    axum::{
        Json,
        extract::{Path, State},
    },
    serde::{Deserialize, Serialize},
    uuid::Uuid,
};

#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct RefundResponse {
    pub order_id: OrderId,
    pub status: PaymentStatus,
    pub refund_id: Option<RefundId>,
}

pub async fn refund_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RefundRequest>,
) -> Result<Json<RefundResponse>, ApiError> {
    let payment = refunds::refund(
        &state.pool,
        state.gateway.as_ref(),
        state.notifier.as_ref(),
        id,
        req.reason,
    )
    .await?;

    Ok(Json(RefundResponse {
        order_id: payment.order_id,
        status: payment.status,
        refund_id: payment.refund_id,
    }))
}
