pub mod http_gateway_client;
pub mod mysql_ledger;
pub mod mysql_order_store;

pub use http_gateway_client::HttpGatewayClient;
pub use mysql_ledger::MySqlLedger;
pub use mysql_order_store::MySqlOrderStore;
