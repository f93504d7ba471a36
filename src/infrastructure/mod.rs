pub mod adapters;
pub mod config;
pub mod flash;
pub mod session;

pub use adapters::{HttpGatewayClient, MySqlLedger, MySqlOrderStore};
pub use config::AppConfig;
pub use flash::{FlashLevel, FlashMessage, FlashStore};
pub use session::CheckoutSessionStore;
