pub mod gateway_port;
pub mod ledger_port;
pub mod order_store_port;

pub use gateway_port::GatewayPort;
pub use ledger_port::LedgerPort;
pub use order_store_port::OrderStorePort;
