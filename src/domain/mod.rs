pub mod entities;
pub mod errors;
pub mod events;
pub mod value_objects;

pub use entities::TransactionRecord;
pub use errors::{DomainError, DomainResult};
pub use events::*;
pub use value_objects::{
    ActionOutcome, Amount, CaptureState, CheckoutMode, PaymentAction, PaymentMethod,
    TransactionState,
};
