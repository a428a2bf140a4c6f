use std::env;

/// Cost in credits of creating one trackable page.
pub const DEFAULT_PAGE_COST: i64 = 180;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub base_url: String,
    /// Shared secret for the card processor's webhook signatures.
    pub card_processor_webhook_secret: String,
    /// Shared secret for the checkout platform's webhook signatures.
    pub checkout_platform_webhook_secret: String,
    pub page_cost: i64,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("PAGELURE_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(4000);

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "pagelure.db".to_string()),
            base_url,
            card_processor_webhook_secret: env::var("CARD_PROCESSOR_WEBHOOK_SECRET")
                .unwrap_or_default(),
            checkout_platform_webhook_secret: env::var("CHECKOUT_PLATFORM_WEBHOOK_SECRET")
                .unwrap_or_default(),
            page_cost: env::var("PAGE_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PAGE_COST),
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
