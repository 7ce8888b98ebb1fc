//! Domain layer - core business logic and entities

pub mod alert;
pub mod market;
pub mod notify;
pub mod price;
