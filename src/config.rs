/// Gateway credentials. `key_id` is public (the client embeds it in
/// checkout); the two secrets never appear in logs or responses.
pub struct GatewayKeys {
    pub key_id: String,
    pub key_secret: String,
    pub webhook_secret: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub gateway_base_url: String,
    pub gateway_key_id: String,
    pub gateway_key_secret: String,
    pub gateway_webhook_secret: String,
    pub gateway_timeout_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            gateway_base_url: std::env::var("RAZORPAY_BASE_URL")
                .unwrap_or_else(|_| "https://api.razorpay.com".to_string()),
            gateway_key_id: std::env::var("RAZORPAY_KEY_ID")
                .expect("RAZORPAY_KEY_ID must be set"),
            gateway_key_secret: std::env::var("RAZORPAY_KEY_SECRET")
                .expect("RAZORPAY_KEY_SECRET must be set"),
            gateway_webhook_secret: std::env::var("RAZORPAY_WEBHOOK_SECRET")
                .expect("RAZORPAY_WEBHOOK_SECRET must be set"),
            gateway_timeout_ms: std::env::var("GATEWAY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
        }
    }

    pub fn keys(&self) -> GatewayKeys {
        GatewayKeys {
            key_id: self.gateway_key_id.clone(),
            key_secret: self.gateway_key_secret.clone(),
            webhook_secret: self.gateway_webhook_secret.clone(),
        }
    }
}
