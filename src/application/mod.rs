pub mod dispatcher;
pub mod dto;
pub mod return_handler;

#[cfg(test)]
pub mod test_support;

pub use dispatcher::{DispatcherSettings, PaymentActionDispatcher};
pub use dto::{
    CheckoutRequest, CheckoutResponse, ErrorResponse, OrderStatusHookRequest,
    PaymentActionRequest, RefundSlipHookRequest,
};
pub use return_handler::{CheckoutSession, ReturnHandler, ReturnHandlerSettings, ReturnOutcome};
