pub mod config;
pub mod error;
pub mod models;
pub mod pricing;
pub mod replica;
pub mod repository;
pub mod rpc;
pub mod schema;
pub mod serializer;
pub mod service;

pub const RESTAURANT_EVENT_CHANNEL: &str = "restaurant.event";
