//! Menu tree assembly: flat catalog rows into categories, items, groups and options.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use prost_types::Timestamp;
use uuid::Uuid;
use zapeat_proto::{common::Money, restaurant_service as proto};

use crate::hours::{is_open, serialize_opening_time};
use crate::models::{
    CustomizationGroup, CustomizationOption, MenuCategory, MenuItem, OpeningTime, Restaurant,
};
use crate::schema::{
    customization_groups, customization_options, menu_categories, menu_items, opening_times,
};

pub fn serialize_restaurant(
    restaurant: &Restaurant,
    opening_times: &[OpeningTime],
    now: DateTime<Utc>,
) -> proto::Restaurant {
    proto::Restaurant {
        id: restaurant.id.to_string(),
        name: restaurant.name.clone(),
        category: proto::RestaurantCategory::from(restaurant.category).into(),
        address: restaurant.address.clone(),
        mobile_number: restaurant.mobile_number.clone(),
        email: restaurant.email.clone(),
        is_online: restaurant.is_online,
        created_at: Some(timestamp(&restaurant.created_at)),
        opening_times: opening_times.iter().map(serialize_opening_time).collect(),
        is_open: is_open(opening_times, now),
    }
}

/// Serializes restaurants with their opening times, in the given order.
pub fn load_restaurants(
    conn: &mut PgConnection,
    restaurants: &[Restaurant],
) -> QueryResult<Vec<proto::Restaurant>> {
    let times = OpeningTime::belonging_to(restaurants)
        .select(OpeningTime::as_select())
        .order((opening_times::weekday.asc(), opening_times::from_hour.asc()))
        .load(conn)?
        .grouped_by(restaurants);
    let now = Utc::now();
    Ok(restaurants
        .iter()
        .zip(times)
        .map(|(restaurant, times)| serialize_restaurant(restaurant, &times, now))
        .collect())
}

pub fn load_restaurant(
    conn: &mut PgConnection,
    restaurant: &Restaurant,
) -> QueryResult<proto::Restaurant> {
    let times = OpeningTime::belonging_to(restaurant)
        .select(OpeningTime::as_select())
        .order((opening_times::weekday.asc(), opening_times::from_hour.asc()))
        .load(conn)?;
    Ok(serialize_restaurant(restaurant, &times, Utc::now()))
}

pub fn serialize_category(
    category: &MenuCategory,
    items: Vec<proto::MenuItem>,
) -> proto::MenuCategory {
    proto::MenuCategory {
        id: category.id.to_string(),
        restaurant_id: category.restaurant_id.to_string(),
        name: category.name.clone(),
        description: category.description.clone(),
        items,
    }
}

pub fn serialize_menu_item(
    item: &MenuItem,
    customization_groups: Vec<proto::CustomizationGroup>,
) -> proto::MenuItem {
    proto::MenuItem {
        id: item.id.to_string(),
        category_id: item.category_id.to_string(),
        name: item.name.clone(),
        description: item.description.clone(),
        price: Some(Money {
            amount: item.price.to_string(),
        }),
        food_type: proto::FoodType::from(item.food_type).into(),
        customizable: item.customizable,
        must_try: item.must_try,
        customization_groups,
    }
}

pub fn serialize_group(
    group: &CustomizationGroup,
    options: Vec<proto::CustomizationOption>,
) -> proto::CustomizationGroup {
    proto::CustomizationGroup {
        id: group.id.to_string(),
        menu_item_id: group.menu_item_id.to_string(),
        name: group.name.clone(),
        min_options_allowed: group.min_options_allowed,
        max_options_allowed: group.max_options_allowed,
        options,
    }
}

pub fn serialize_option(option: &CustomizationOption) -> proto::CustomizationOption {
    proto::CustomizationOption {
        id: option.id.to_string(),
        group_id: option.group_id.to_string(),
        name: option.name.clone(),
        price: Some(Money {
            amount: option.price.to_string(),
        }),
        food_type: proto::FoodType::from(option.food_type).into(),
    }
}

fn timestamp(dt: &DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: dt.timestamp(),
        nanos: dt.timestamp_subsec_nanos() as i32,
    }
}

/// Nests the rows of one restaurant's menu. Every level keeps the order of
/// the rows it was given.
pub fn assemble_menu(
    restaurant_id: &Uuid,
    categories: Vec<MenuCategory>,
    items: Vec<MenuItem>,
    groups: Vec<CustomizationGroup>,
    options: Vec<CustomizationOption>,
) -> proto::Menu {
    let mut options_by_group: HashMap<Uuid, Vec<proto::CustomizationOption>> = groups
        .iter()
        .zip(options.grouped_by(&groups))
        .map(|(group, options)| (group.id, options.iter().map(serialize_option).collect()))
        .collect();

    let mut groups_by_item: HashMap<Uuid, Vec<proto::CustomizationGroup>> = items
        .iter()
        .zip(groups.grouped_by(&items))
        .map(|(item, groups)| {
            let groups = groups
                .iter()
                .map(|g| serialize_group(g, options_by_group.remove(&g.id).unwrap_or_default()))
                .collect();
            (item.id, groups)
        })
        .collect();

    let categories = categories
        .iter()
        .zip(items.grouped_by(&categories))
        .map(|(category, items)| {
            let items = items
                .iter()
                .map(|i| serialize_menu_item(i, groups_by_item.remove(&i.id).unwrap_or_default()))
                .collect();
            serialize_category(category, items)
        })
        .collect();

    proto::Menu {
        restaurant_id: restaurant_id.to_string(),
        categories,
    }
}

pub fn load_menu(conn: &mut PgConnection, restaurant: &Restaurant) -> QueryResult<proto::Menu> {
    let categories = MenuCategory::belonging_to(restaurant)
        .select(MenuCategory::as_select())
        .order((menu_categories::created_at.asc(), menu_categories::id.asc()))
        .load(conn)?;
    let items = MenuItem::belonging_to(&categories)
        .select(MenuItem::as_select())
        .order((menu_items::created_at.asc(), menu_items::id.asc()))
        .load(conn)?;
    let groups = CustomizationGroup::belonging_to(&items)
        .select(CustomizationGroup::as_select())
        .order((customization_groups::created_at.asc(), customization_groups::id.asc()))
        .load(conn)?;
    let options = CustomizationOption::belonging_to(&groups)
        .select(CustomizationOption::as_select())
        .order((customization_options::created_at.asc(), customization_options::id.asc()))
        .load(conn)?;

    Ok(assemble_menu(&restaurant.id, categories, items, groups, options))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::models::FoodType;

    fn category(restaurant_id: Uuid, name: &str) -> MenuCategory {
        MenuCategory {
            id: Uuid::new_v4(),
            restaurant_id,
            name: name.to_string(),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn item(category: &MenuCategory, name: &str, price: &str) -> MenuItem {
        MenuItem {
            id: Uuid::new_v4(),
            category_id: category.id,
            name: name.to_string(),
            description: None,
            price: BigDecimal::from_str(price).unwrap(),
            food_type: FoodType::Veg,
            customizable: false,
            must_try: false,
            created_at: Utc::now(),
        }
    }

    fn group(item: &MenuItem, name: &str) -> CustomizationGroup {
        CustomizationGroup {
            id: Uuid::new_v4(),
            menu_item_id: item.id,
            name: name.to_string(),
            min_options_allowed: 0,
            max_options_allowed: 1,
            created_at: Utc::now(),
        }
    }

    fn option(group: &CustomizationGroup, name: &str, price: &str) -> CustomizationOption {
        CustomizationOption {
            id: Uuid::new_v4(),
            group_id: group.id,
            name: name.to_string(),
            price: BigDecimal::from_str(price).unwrap(),
            food_type: FoodType::NonVeg,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn rows_are_nested_under_their_parents() {
        let restaurant_id = Uuid::new_v4();
        let mains = category(restaurant_id, "Mains");
        let sides = category(restaurant_id, "Sides");
        let burger = item(&mains, "Burger", "100.00");
        let wrap = item(&mains, "Wrap", "80.00");
        let fries = item(&sides, "Fries", "30.00");
        let toppings = group(&burger, "Toppings");
        let salt = group(&fries, "Salt");
        let cheese = option(&toppings, "Extra Cheese", "20.00");
        let bacon = option(&toppings, "Bacon", "35.00");
        let salted = option(&salt, "Salted", "5.00");

        let menu = assemble_menu(
            &restaurant_id,
            vec![mains.clone(), sides.clone()],
            vec![burger.clone(), wrap.clone(), fries.clone()],
            vec![toppings.clone(), salt.clone()],
            vec![cheese.clone(), salted.clone(), bacon.clone()],
        );

        assert_eq!(menu.restaurant_id, restaurant_id.to_string());
        assert_eq!(menu.categories.len(), 2);
        let mains = &menu.categories[0];
        assert_eq!(mains.name, "Mains");
        assert_eq!(
            mains.items.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            vec!["Burger", "Wrap"]
        );
        let burger = &mains.items[0];
        assert_eq!(burger.price.as_ref().unwrap().amount, "100.00");
        assert_eq!(burger.customization_groups.len(), 1);
        assert_eq!(
            burger.customization_groups[0]
                .options
                .iter()
                .map(|o| o.name.as_str())
                .collect::<Vec<_>>(),
            vec!["Extra Cheese", "Bacon"]
        );
        assert!(mains.items[1].customization_groups.is_empty());

        let sides = &menu.categories[1];
        assert_eq!(sides.items[0].customization_groups[0].options[0].name, "Salted");
        assert_eq!(
            sides.items[0].customization_groups[0].options[0].food_type,
            proto::FoodType::NonVeg as i32
        );
    }

    #[test]
    fn empty_categories_are_kept() {
        let restaurant_id = Uuid::new_v4();
        let drinks = category(restaurant_id, "Drinks");

        let menu = assemble_menu(&restaurant_id, vec![drinks], vec![], vec![], vec![]);

        assert_eq!(menu.categories.len(), 1);
        assert!(menu.categories[0].items.is_empty());
    }
}
