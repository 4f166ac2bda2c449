use {
    super::booking::BookingRef,
    super::error::PaymentError,
    super::id::{OrderId, PaymentId, RefundId},
    super::money::{Money, MoneyAmount},
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    std::fmt,
    uuid::Uuid,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Created,
    Authorized,
    Captured,
    Failed,
    RefundInitiated,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Authorized => "authorized",
            Self::Captured => "captured",
            Self::Failed => "failed",
            Self::RefundInitiated => "refund_initiated",
            Self::Refunded => "refunded",
        }
    }

    /// The legal-transition table. Status only moves forward along
    /// created -> authorized -> captured -> refund_initiated -> refunded,
    /// with failure as the only exit before capture.
    pub fn can_transition_to(&self, next: &PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Created, Authorized)
                | (Created, Captured)
                | (Created, Failed)
                | (Authorized, Captured)
                | (Authorized, Failed)
                | (Captured, RefundInitiated)
                | (RefundInitiated, Refunded)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Refunded)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = PaymentError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "created" => Ok(Self::Created),
            "authorized" => Ok(Self::Authorized),
            "captured" => Ok(Self::Captured),
            "failed" => Ok(Self::Failed),
            "refund_initiated" => Ok(Self::RefundInitiated),
            "refunded" => Ok(Self::Refunded),
            other => Err(PaymentError::Validation(format!(
                "unknown payment status: {other}"
            ))),
        }
    }
}

/// Payment-method metadata reported by the gateway on authorization or
/// capture. Kept for receipts; card data beyond last-4 never lands here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub method: String,
    pub card_last4: Option<String>,
    pub card_network: Option<String>,
}

/// A verified signal driving the state machine. The target status is a
/// function of the event, so the legality check is one table lookup.
#[derive(Debug, Clone)]
pub enum PaymentEvent {
    Authorized {
        payment_id: PaymentId,
        method: Option<MethodInfo>,
    },
    Captured {
        payment_id: PaymentId,
        /// Present on webhook deliveries, absent on the client
        /// verification path. When present it must match the order.
        amount: Option<MoneyAmount>,
        method: Option<MethodInfo>,
    },
    Failed {
        payment_id: Option<PaymentId>,
        error: String,
    },
    RefundInitiated {
        refund_id: RefundId,
        reason: String,
    },
    Refunded,
}

impl PaymentEvent {
    pub fn target_status(&self) -> PaymentStatus {
        match self {
            Self::Authorized { .. } => PaymentStatus::Authorized,
            Self::Captured { .. } => PaymentStatus::Captured,
            Self::Failed { .. } => PaymentStatus::Failed,
            Self::RefundInitiated { .. } => PaymentStatus::RefundInitiated,
            Self::Refunded => PaymentStatus::Refunded,
        }
    }
}

/// Full payment record — one row per gateway order attempt, never deleted.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: OrderId,
    pub payment_id: Option<PaymentId>,
    pub money: Money,
    pub status: PaymentStatus,
    pub method: Option<MethodInfo>,
    pub email: String,
    pub contact: String,
    pub booking: BookingRef,
    pub error_message: Option<String>,
    pub refund_id: Option<RefundId>,
    pub refund_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
}

/// For INSERT — always starts in `created`, id generated via Uuid::now_v7().
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub id: Uuid,
    pub order_id: OrderId,
    pub money: Money,
    pub email: String,
    pub contact: String,
    pub booking: BookingRef,
}
