//! Delivery callbacks: events reported by the provider after a send.

mod errors;
mod event;
mod handler;

pub use errors::CallbackError;
pub use event::{DeliveryEvent, DeliveryEventKind};
pub use handler::CallbackHandler;

#[cfg(test)]
pub mod tests {
    pub use super::handler::MockCallbackHandler;
}
