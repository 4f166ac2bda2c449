pub mod adapters {
    pub mod api_errors;
    pub mod checkout;
    pub mod orders;
    pub mod refunds;
    pub mod webhook;
}
pub mod config;
pub mod domain {
    pub mod booking;
    pub mod error;
    pub mod id;
    pub mod money;
    pub mod notify;
    pub mod payment;
}
pub mod gateway;
pub mod infra {
    pub mod postgres {
        pub mod audit_repo;
        pub mod booking_repo;
        pub mod event_repo;
        pub mod payment_repo;
    }
}
pub mod services {
    pub mod orders;
    pub mod refunds;
    pub mod transitions;
    pub mod webhook;
}

use std::sync::Arc;

use crate::{config::GatewayKeys, domain::notify::PaymentNotifier, gateway::PaymentGateway};

#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub gateway: Arc<dyn PaymentGateway>,
    pub notifier: Arc<dyn PaymentNotifier>,
    pub keys: Arc<GatewayKeys>,
}
