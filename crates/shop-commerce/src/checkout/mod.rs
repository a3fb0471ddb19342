//! Checkout module.
//!
//! Turns the cart selection into a single outstanding batch and settles the
//! cart once the external payment screen confirms or abandons it.

mod flow;

pub use flow::{CheckoutBatch, CheckoutFlow, CheckoutState, PaymentMethod};
