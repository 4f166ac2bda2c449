use {
    super::{GatewayOrder, GatewayRefund, PaymentGateway},
    crate::domain::{
        error::PaymentError,
        id::{OrderId, PaymentId, RefundId},
        money::{Currency, MoneyAmount},
    },
    serde::Deserialize,
    serde_json::json,
    std::{future::Future, pin::Pin, time::Duration},
};

/// REST client for the Razorpay-style gateway. The `reqwest::Client` is
/// built once in main and injected; every request carries an explicit
/// timeout.
pub struct RazorpayGateway {
    base_url: String,
    key_id: String,
    key_secret: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RefundResponse {
    id: String,
    status: String,
}

impl RazorpayGateway {
    pub fn new(
        base_url: impl Into<String>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            timeout,
            client,
        }
    }

    async fn create_order_inner(
        &self,
        amount: MoneyAmount,
        currency: Currency,
        receipt: String,
    ) -> Result<GatewayOrder, PaymentError> {
        let url = format!("{}/v1/orders", self.base_url);
        let body = json!({
            "amount": amount.minor(),
            "currency": currency.gateway_code(),
            "receipt": receipt,
            "payment_capture": 1,
        });

        let resp = self
            .client
            .post(url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| PaymentError::GatewayUnavailable(e.to_string()))?;

        let parsed = check(resp).await?.json::<OrderResponse>().await;
        let order = parsed.map_err(|e| PaymentError::GatewayUnavailable(e.to_string()))?;
        Ok(GatewayOrder {
            order_id: OrderId::new(order.id)?,
        })
    }

    async fn create_refund_inner(
        &self,
        payment_id: PaymentId,
        amount: MoneyAmount,
        reason: String,
    ) -> Result<GatewayRefund, PaymentError> {
        let url = format!("{}/v1/payments/{}/refund", self.base_url, payment_id);
        let body = json!({
            "amount": amount.minor(),
            "notes": { "reason": reason },
        });

        let resp = self
            .client
            .post(url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| PaymentError::GatewayUnavailable(e.to_string()))?;

        let parsed = check(resp).await?.json::<RefundResponse>().await;
        let refund = parsed.map_err(|e| PaymentError::GatewayUnavailable(e.to_string()))?;
        Ok(GatewayRefund {
            refund_id: RefundId::new(refund.id)?,
            processed: refund.status == "processed",
        })
    }
}

/// Non-2xx gateway responses become `GatewayUnavailable` with a bounded
/// slice of the body for diagnostics.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response, PaymentError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(200).collect();
    Err(PaymentError::GatewayUnavailable(format!(
        "HTTP {}: {snippet}",
        status.as_u16()
    )))
}

impl PaymentGateway for RazorpayGateway {
    fn create_order(
        &self,
        amount: MoneyAmount,
        currency: Currency,
        receipt: String,
    ) -> Pin<Box<dyn Future<Output = Result<GatewayOrder, PaymentError>> + Send + '_>> {
        Box::pin(self.create_order_inner(amount, currency, receipt))
    }

    fn create_refund(
        &self,
        payment_id: PaymentId,
        amount: MoneyAmount,
        reason: String,
    ) -> Pin<Box<dyn Future<Output = Result<GatewayRefund, PaymentError>> + Send + '_>> {
        Box::pin(self.create_refund_inner(payment_id, amount, reason))
    }
}
