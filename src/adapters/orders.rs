use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{
            booking::BookingRef,
            error::PaymentError,
            id::OrderId,
            money::{Currency, MoneyAmount},
            payment::PaymentStatus,
        },
        infra::postgres::payment_repo,
        services::orders::{self, CreateOrder},
    },
    axum::{
        Json,
        extract::{Path, State},
    },
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub booking: BookingRef,
    pub amount: i64,
    pub currency: Currency,
    pub email: String,
    pub contact: String,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order_id: OrderId,
    pub key_id: String,
    pub amount: i64,
    pub currency: Currency,
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    let amount = MoneyAmount::new(req.amount)?;

    let created = orders::create_order(
        &state.pool,
        state.gateway.as_ref(),
        &state.keys.key_id,
        CreateOrder {
            booking: req.booking,
            amount,
            currency: req.currency,
            email: req.email,
            contact: req.contact,
        },
    )
    .await?;

    Ok(Json(CreateOrderResponse {
        order_id: created.order_id,
        key_id: created.key_id,
        amount: created.amount.minor(),
        currency: created.currency,
    }))
}

/// The client may navigate away before its verification call lands; the
/// stored row, not the browser, is the source of truth it re-queries.
#[derive(Debug, Serialize)]
pub struct OrderStatusResponse {
    pub order_id: OrderId,
    pub status: PaymentStatus,
    pub amount: i64,
    pub currency: Currency,
    pub completed_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

pub async fn order_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderStatusResponse>, ApiError> {
    let order_id = OrderId::new(order_id)?;
    let payment = payment_repo::get_by_order_id(&state.pool, &order_id)
        .await?
        .ok_or(PaymentError::NotFound)?;

    Ok(Json(OrderStatusResponse {
        order_id: payment.order_id,
        status: payment.status,
        amount: payment.money.amount().minor(),
        currency: payment.money.currency(),
        completed_at: payment.completed_at,
        refunded_at: payment.refunded_at,
        error_message: payment.error_message,
    }))
}
