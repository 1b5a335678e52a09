//! Keeps the local copy of restaurant menus in step with catalog events.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;
use zapeat_proto::{
    common::Money,
    restaurant_service::{restaurant_event, Menu, RestaurantEvent},
};

use crate::models::{Restaurant, RestaurantCustomizationOption, RestaurantMenuItem};
use crate::repository::{OrderRepository, RepositoryError};

#[derive(Error, Debug)]
pub enum ReplicaError {
    #[error("malformed restaurant event: {0}")]
    Malformed(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub fn apply_restaurant_event<R: OrderRepository>(
    repository: &R,
    event: RestaurantEvent,
) -> Result<(), ReplicaError> {
    match event.event {
        Some(restaurant_event::Event::RestaurantCreated(event)) => {
            let restaurant = Restaurant {
                id: parse_id(&event.id, "restaurant id")?,
                name: event.name,
            };
            repository.upsert_restaurant(&restaurant)?;
            info!(restaurant_id = %restaurant.id, "restaurant replicated");
            Ok(())
        }
        Some(restaurant_event::Event::RestaurantUpdated(event)) => {
            let restaurant = Restaurant {
                id: parse_id(&event.id, "restaurant id")?,
                name: event.name,
            };
            repository.upsert_restaurant(&restaurant)?;
            info!(restaurant_id = %restaurant.id, "restaurant update replicated");
            Ok(())
        }
        Some(restaurant_event::Event::RestaurantDeleted(event)) => {
            let restaurant_id = parse_id(&event.id, "restaurant id")?;
            repository.remove_restaurant(&restaurant_id)?;
            info!(%restaurant_id, "restaurant removed from replica");
            Ok(())
        }
        Some(restaurant_event::Event::RestaurantMenuRevised(event)) => {
            let restaurant_id = parse_id(&event.id, "restaurant id")?;
            let menu = event.menu.unwrap_or_default();
            let (menu_items, options) = flatten_menu(&restaurant_id, &menu)?;
            repository.replace_menu(&restaurant_id, &menu_items, &options)?;
            info!(
                %restaurant_id,
                menu_items = menu_items.len(),
                options = options.len(),
                "restaurant menu replicated"
            );
            Ok(())
        }
        None => Err(ReplicaError::Malformed("empty event".to_string())),
    }
}

fn flatten_menu(
    restaurant_id: &Uuid,
    menu: &Menu,
) -> Result<(Vec<RestaurantMenuItem>, Vec<RestaurantCustomizationOption>), ReplicaError> {
    let mut menu_items = Vec::new();
    let mut options = Vec::new();
    for item in menu.categories.iter().flat_map(|c| c.items.iter()) {
        let menu_item_id = parse_id(&item.id, "menu item id")?;
        menu_items.push(RestaurantMenuItem {
            id: menu_item_id,
            restaurant_id: *restaurant_id,
            name: item.name.clone(),
            price: parse_money(item.price.as_ref())?,
        });
        for option in item.customization_groups.iter().flat_map(|g| g.options.iter()) {
            options.push(RestaurantCustomizationOption {
                id: parse_id(&option.id, "customization option id")?,
                menu_item_id,
                name: option.name.clone(),
                price: parse_money(option.price.as_ref())?,
            });
        }
    }
    Ok((menu_items, options))
}

fn parse_id(value: &str, what: &str) -> Result<Uuid, ReplicaError> {
    value
        .parse()
        .map_err(|_| ReplicaError::Malformed(format!("invalid {what} {value:?}")))
}

fn parse_money(money: Option<&Money>) -> Result<BigDecimal, ReplicaError> {
    let amount = money
        .map(|m| m.amount.as_str())
        .ok_or_else(|| ReplicaError::Malformed("missing price".to_string()))?;
    BigDecimal::from_str(amount)
        .map_err(|_| ReplicaError::Malformed(format!("invalid price {amount:?}")))
}
