pub mod settings;

pub use settings::{
    ApiKeys, AppConfig, CardsConfig, GatewayEndpoints, MethodSettings, MobilePayConfig,
    OrderStatusMap, PaymentMethodConfig, TransactionMode,
};
