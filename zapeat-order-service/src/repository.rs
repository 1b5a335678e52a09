use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Order, OrderItem, Restaurant, RestaurantCustomizationOption, RestaurantMenuItem,
};

#[cfg(test)]
pub mod memory;
pub mod pg;

pub use pg::PgOrderRepository;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("cannot connect to database: {0}")]
    Connection(#[from] diesel::ConnectionError),
}

/// Filter and page for order listings. Orders come newest first.
#[derive(Clone, Debug, Default)]
pub struct OrderQuery {
    pub customer_id: Option<Uuid>,
    pub restaurant_id: Option<Uuid>,
    pub after: Option<(DateTime<Utc>, Uuid)>,
    pub limit: i64,
}

/// Storage for orders and for the local copy of the priced catalog.
pub trait OrderRepository: Send + Sync + 'static {
    fn find_restaurant(&self, id: &Uuid) -> Result<Option<Restaurant>, RepositoryError>;

    fn find_menu_items(&self, ids: &[Uuid]) -> Result<Vec<RestaurantMenuItem>, RepositoryError>;

    fn find_customization_options(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<RestaurantCustomizationOption>, RepositoryError>;

    /// Writes the order and all of its items, or nothing.
    fn insert_order(&self, order: &Order, items: &[OrderItem]) -> Result<(), RepositoryError>;

    fn get_order(&self, id: &Uuid) -> Result<Option<(Order, Vec<OrderItem>)>, RepositoryError>;

    fn list_orders(
        &self,
        query: &OrderQuery,
    ) -> Result<Vec<(Order, Vec<OrderItem>)>, RepositoryError>;

    /// Locks the order, lets `change` compute its new state, and stores the
    /// status columns and `updated_at` of the result.
    fn modify_order<E, F>(&self, id: &Uuid, change: F) -> Result<Option<Order>, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(Order) -> Result<Order, E>;

    fn upsert_restaurant(&self, restaurant: &Restaurant) -> Result<(), RepositoryError>;

    /// Drops the restaurant and its menu. Placed orders are kept.
    fn remove_restaurant(&self, id: &Uuid) -> Result<(), RepositoryError>;

    /// Replaces every menu item and option of the restaurant.
    fn replace_menu(
        &self,
        restaurant_id: &Uuid,
        menu_items: &[RestaurantMenuItem],
        options: &[RestaurantCustomizationOption],
    ) -> Result<(), RepositoryError>;
}
