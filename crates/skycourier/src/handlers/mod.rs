//! http handlers for the skycourier api.

pub mod admin;
pub mod cursor;
pub mod drone;
mod dto;
mod error;
mod health;
pub mod orders;

pub use dto::{DroneResponse, OrderResponse};
pub use error::ApiError;
pub use health::health;
