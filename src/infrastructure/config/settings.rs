use crate::domain::value_objects::{CheckoutMode, PaymentMethod};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;

/// Account mode; selects the key pair and the hosted-checkout URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionMode {
    Live,
    Test,
}

/// Gateway key pairs for both modes.
#[derive(Debug, Clone)]
pub struct ApiKeys {
    pub live_public_key: String,
    pub live_secret_key: String,
    pub test_public_key: String,
    pub test_secret_key: String,
}

/// Gateway endpoints.
#[derive(Debug, Clone)]
pub struct GatewayEndpoints {
    pub api_base_url: String,
    pub hosted_checkout_url: String,
    pub test_hosted_checkout_url: String,
}

/// Order-status ids the engine reads and writes.
#[derive(Debug, Clone)]
pub struct OrderStatusMap {
    /// Payment accepted, capture still pending
    pub paid: i32,
    /// Captured orders; also the delayed-capture trigger status
    pub captured: i32,
    pub canceled: i32,
    pub refunded: i32,
}

/// Settings every payment method carries.
#[derive(Debug, Clone)]
pub struct MethodSettings {
    pub title: String,
    pub description: String,
    pub logo_url: String,
    pub checkout_mode: CheckoutMode,
}

#[derive(Debug, Clone)]
pub struct CardsConfig {
    pub settings: MethodSettings,
}

#[derive(Debug, Clone)]
pub struct MobilePayConfig {
    pub settings: MethodSettings,
    /// Wallet configuration id issued by the gateway
    pub configuration_id: String,
}

/// Per-method configuration as a tagged variant; settings are resolved into
/// these structs once, never looked up by string key.
#[derive(Debug, Clone)]
pub enum PaymentMethodConfig {
    Cards(CardsConfig),
    MobilePay(MobilePayConfig),
}

impl PaymentMethodConfig {
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentMethodConfig::Cards(_) => PaymentMethod::Cards,
            PaymentMethodConfig::MobilePay(_) => PaymentMethod::MobilePay,
        }
    }

    pub fn settings(&self) -> &MethodSettings {
        match self {
            PaymentMethodConfig::Cards(config) => &config.settings,
            PaymentMethodConfig::MobilePay(config) => &config.settings,
        }
    }

    pub fn configuration_id(&self) -> Option<&str> {
        match self {
            PaymentMethodConfig::Cards(_) => None,
            PaymentMethodConfig::MobilePay(config) => Some(&config.configuration_id),
        }
    }
}

/// Everything the service needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: TransactionMode,
    pub keys: ApiKeys,
    pub endpoints: GatewayEndpoints,
    pub statuses: OrderStatusMap,
    pub cards: CardsConfig,
    pub mobile_pay: Option<MobilePayConfig>,
    pub shop_name: String,
    pub platform_name: String,
    pub platform_version: String,
    /// Shopper return endpoint of this service
    pub return_url: String,
}

impl AppConfig {
    pub fn from_env() -> Arc<Self> {
        let mode = match env_or("PAYMENT_TRANSACTION_MODE", "live").as_str() {
            "test" => TransactionMode::Test,
            _ => TransactionMode::Live,
        };

        let keys = ApiKeys {
            live_public_key: env_or("PAYMENT_LIVE_PUBLIC_KEY", ""),
            live_secret_key: env_or("PAYMENT_LIVE_SECRET_KEY", ""),
            test_public_key: env_or("PAYMENT_TEST_PUBLIC_KEY", ""),
            test_secret_key: env_or("PAYMENT_TEST_SECRET_KEY", ""),
        };

        let config = Self {
            mode,
            keys,
            endpoints: GatewayEndpoints {
                api_base_url: env_or("GATEWAY_API_URL", "https://api.gateway.example"),
                hosted_checkout_url: env_or(
                    "GATEWAY_HOSTED_CHECKOUT_URL",
                    "https://pay.gateway.example/",
                ),
                test_hosted_checkout_url: env_or(
                    "GATEWAY_TEST_HOSTED_CHECKOUT_URL",
                    "https://hosted-checkout.staging.gateway.example/",
                ),
            },
            statuses: OrderStatusMap {
                paid: env_i32("ORDER_STATUS_PAID", 2),
                captured: env_i32("ORDER_STATUS_CAPTURED", 5),
                canceled: env_i32("ORDER_STATUS_CANCELED", 6),
                refunded: env_i32("ORDER_STATUS_REFUNDED", 7),
            },
            cards: CardsConfig {
                settings: MethodSettings {
                    title: env_or("CARDS_TITLE", "Credit card"),
                    description: env_or("CARDS_DESCRIPTION", "Secure payment with credit card"),
                    logo_url: env_or("CARDS_LOGO_URL", ""),
                    checkout_mode: parse_checkout_mode(&env_or("CARDS_CHECKOUT_MODE", "delayed")),
                },
            },
            mobile_pay: env::var("MOBILEPAY_CONFIGURATION_ID")
                .ok()
                .map(|configuration_id| MobilePayConfig {
                    settings: MethodSettings {
                        title: env_or("MOBILEPAY_TITLE", "MobilePay"),
                        description: env_or("MOBILEPAY_DESCRIPTION", "Pay with MobilePay"),
                        logo_url: env_or("MOBILEPAY_LOGO_URL", ""),
                        checkout_mode: parse_checkout_mode(&env_or(
                            "MOBILEPAY_CHECKOUT_MODE",
                            "delayed",
                        )),
                    },
                    configuration_id,
                }),
            shop_name: env_or("SHOP_NAME", "Payment"),
            platform_name: env_or("PLATFORM_NAME", "storefront"),
            platform_version: env_or("PLATFORM_VERSION", "1.0.0"),
            return_url: env_or(
                "CHECKOUT_RETURN_URL",
                "http://localhost:3000/api/checkout/return",
            ),
        };

        if config.secret_key().is_empty() || config.public_key().is_empty() {
            panic!("Gateway keys must be set for the configured transaction mode");
        }

        Arc::new(config)
    }

    pub fn secret_key(&self) -> &str {
        match self.mode {
            TransactionMode::Live => &self.keys.live_secret_key,
            TransactionMode::Test => &self.keys.test_secret_key,
        }
    }

    pub fn public_key(&self) -> &str {
        match self.mode {
            TransactionMode::Live => &self.keys.live_public_key,
            TransactionMode::Test => &self.keys.test_public_key,
        }
    }

    pub fn hosted_checkout_url(&self) -> &str {
        match self.mode {
            TransactionMode::Live => &self.endpoints.hosted_checkout_url,
            TransactionMode::Test => &self.endpoints.test_hosted_checkout_url,
        }
    }

    /// Resolve the configuration for a chosen method; `None` when the
    /// method is not set up.
    pub fn method_config(&self, method: PaymentMethod) -> Option<PaymentMethodConfig> {
        match method {
            PaymentMethod::Cards => Some(PaymentMethodConfig::Cards(self.cards.clone())),
            PaymentMethod::MobilePay => self
                .mobile_pay
                .clone()
                .map(PaymentMethodConfig::MobilePay),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_i32(key: &str, default: i32) -> i32 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn parse_checkout_mode(value: &str) -> CheckoutMode {
    match value {
        "instant" => CheckoutMode::Instant,
        _ => CheckoutMode::Delayed,
    }
}
