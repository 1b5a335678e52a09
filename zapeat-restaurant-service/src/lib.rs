pub mod config;
pub mod error;
pub mod events;
pub mod hours;
pub mod menu;
pub mod models;
pub mod rpc;
pub mod schema;
pub mod validation;

pub const EVENT_CHANNEL: &str = "restaurant.event";
