use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use super::{OrderQuery, OrderRepository, RepositoryError};
use crate::models::{
    Order, OrderItem, Restaurant, RestaurantCustomizationOption, RestaurantMenuItem,
};

#[derive(Default)]
struct State {
    restaurants: HashMap<Uuid, Restaurant>,
    menu_items: HashMap<Uuid, RestaurantMenuItem>,
    options: HashMap<Uuid, RestaurantCustomizationOption>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    fail_next_insert: bool,
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    state: Mutex<State>,
}

impl InMemoryOrderRepository {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes the next `insert_order` fail as a broken connection would.
    pub fn fail_next_insert(&self) {
        self.state().fail_next_insert = true;
    }

    pub fn order_count(&self) -> usize {
        self.state().orders.len()
    }

    pub fn order_item_count(&self) -> usize {
        self.state().order_items.len()
    }

    pub fn set_menu_item_price(&self, id: &Uuid, price: bigdecimal::BigDecimal) {
        if let Some(item) = self.state().menu_items.get_mut(id) {
            item.price = price;
        }
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn find_restaurant(&self, id: &Uuid) -> Result<Option<Restaurant>, RepositoryError> {
        Ok(self.state().restaurants.get(id).cloned())
    }

    fn find_menu_items(&self, ids: &[Uuid]) -> Result<Vec<RestaurantMenuItem>, RepositoryError> {
        let state = self.state();
        Ok(ids
            .iter()
            .filter_map(|id| state.menu_items.get(id).cloned())
            .collect())
    }

    fn find_customization_options(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<RestaurantCustomizationOption>, RepositoryError> {
        let state = self.state();
        Ok(ids
            .iter()
            .filter_map(|id| state.options.get(id).cloned())
            .collect())
    }

    fn insert_order(&self, order: &Order, items: &[OrderItem]) -> Result<(), RepositoryError> {
        let mut state = self.state();
        if std::mem::take(&mut state.fail_next_insert) {
            return Err(RepositoryError::Database(
                diesel::result::Error::RollbackTransaction,
            ));
        }
        state.orders.push(order.clone());
        state.order_items.extend(items.iter().cloned());
        Ok(())
    }

    fn get_order(&self, id: &Uuid) -> Result<Option<(Order, Vec<OrderItem>)>, RepositoryError> {
        let state = self.state();
        Ok(state.orders.iter().find(|o| &o.id == id).map(|order| {
            let items = state
                .order_items
                .iter()
                .filter(|i| &i.order_id == id)
                .cloned()
                .collect();
            (order.clone(), items)
        }))
    }

    fn list_orders(
        &self,
        query: &OrderQuery,
    ) -> Result<Vec<(Order, Vec<OrderItem>)>, RepositoryError> {
        let state = self.state();
        let mut orders = state
            .orders
            .iter()
            .filter(|o| query.customer_id.map_or(true, |c| o.customer_id == c))
            .filter(|o| query.restaurant_id.map_or(true, |r| o.restaurant_id == r))
            .filter(|o| {
                query.after.map_or(true, |(created_at, id)| {
                    o.created_at < created_at || (o.created_at == created_at && o.id > id)
                })
            })
            .cloned()
            .collect::<Vec<_>>();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        orders.truncate(query.limit.max(0) as usize);
        Ok(orders
            .into_iter()
            .map(|order| {
                let items = state
                    .order_items
                    .iter()
                    .filter(|i| i.order_id == order.id)
                    .cloned()
                    .collect();
                (order, items)
            })
            .collect())
    }

    fn modify_order<E, F>(&self, id: &Uuid, change: F) -> Result<Option<Order>, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(Order) -> Result<Order, E>,
    {
        let mut state = self.state();
        let Some(slot) = state.orders.iter_mut().find(|o| &o.id == id) else {
            return Ok(None);
        };
        let changed = change(slot.clone())?;
        slot.order_status = changed.order_status;
        slot.restaurant_status = changed.restaurant_status;
        slot.payment_status = changed.payment_status;
        slot.updated_at = changed.updated_at;
        Ok(Some(slot.clone()))
    }

    fn upsert_restaurant(&self, restaurant: &Restaurant) -> Result<(), RepositoryError> {
        self.state()
            .restaurants
            .insert(restaurant.id, restaurant.clone());
        Ok(())
    }

    fn remove_restaurant(&self, id: &Uuid) -> Result<(), RepositoryError> {
        let mut state = self.state();
        state.restaurants.remove(id);
        state.menu_items.retain(|_, i| &i.restaurant_id != id);
        let State { menu_items, options, .. } = &mut *state;
        options.retain(|_, o| menu_items.contains_key(&o.menu_item_id));
        Ok(())
    }

    fn replace_menu(
        &self,
        restaurant_id: &Uuid,
        menu_items: &[RestaurantMenuItem],
        options: &[RestaurantCustomizationOption],
    ) -> Result<(), RepositoryError> {
        let mut state = self.state();
        let removed: Vec<Uuid> = state
            .menu_items
            .values()
            .filter(|i| &i.restaurant_id == restaurant_id)
            .map(|i| i.id)
            .collect();
        for id in &removed {
            state.menu_items.remove(id);
        }
        state.options.retain(|_, o| !removed.contains(&o.menu_item_id));
        for item in menu_items {
            state.menu_items.insert(item.id, item.clone());
        }
        for option in options {
            state.options.insert(option.id, option.clone());
        }
        Ok(())
    }
}
