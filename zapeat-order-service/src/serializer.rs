use chrono::{DateTime, Utc};
use prost_types::Timestamp;
use uuid::Uuid;
use zapeat_proto::{common::Money, order_service as proto};

use crate::models;
use crate::service::PlacedOrder;

pub fn serialize_order(placed: &PlacedOrder) -> proto::Order {
    let order = &placed.order;
    proto::Order {
        id: order.id.to_string(),
        customer_id: order.customer_id.to_string(),
        restaurant_id: order.restaurant_id.to_string(),
        payment_status: proto::PaymentStatus::from(order.payment_status).into(),
        order_status: proto::OrderStatus::from(order.order_status).into(),
        restaurant_status: proto::RestaurantStatus::from(order.restaurant_status).into(),
        total_amount: Some(Money {
            amount: order.total_amount.to_string(),
        }),
        special_instructions: order.special_instructions.clone(),
        delivery_address: order.delivery_address.clone(),
        items: placed.items.iter().map(serialize_order_item).collect(),
        created_at: Some(timestamp(&order.created_at)),
        updated_at: Some(timestamp(&order.updated_at)),
    }
}

fn serialize_order_item(item: &models::OrderItem) -> proto::OrderItem {
    proto::OrderItem {
        id: item.id.to_string(),
        menu_item_id: item.menu_item_id.to_string(),
        name: item.name.clone(),
        quantity: item.quantity,
        customization_option_id: item.customization_option_id.map(|id| id.to_string()),
        customization_name: item.customization_name.clone(),
        price: Some(Money {
            amount: item.price.to_string(),
        }),
    }
}

fn timestamp(dt: &DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: dt.timestamp(),
        nanos: dt.timestamp_subsec_nanos() as i32,
    }
}

/// Cursor of an order in a listing: `<created_at in unix micros>:<id>`.
pub fn order_cursor(order: &models::Order) -> String {
    format!("{}:{}", order.created_at.timestamp_micros(), order.id)
}

pub fn parse_order_cursor(cursor: &str) -> Option<(DateTime<Utc>, Uuid)> {
    let (micros, id) = cursor.split_once(':')?;
    let created_at = DateTime::from_timestamp_micros(micros.parse().ok()?)?;
    Some((created_at, id.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_round_trips_with_microsecond_precision() {
        let created_at = DateTime::from_timestamp_micros(1_735_689_600_123_456).unwrap();
        let id = Uuid::new_v4();
        let cursor = format!("{}:{}", created_at.timestamp_micros(), id);

        assert_eq!(parse_order_cursor(&cursor), Some((created_at, id)));
    }

    #[test]
    fn malformed_cursors_are_rejected() {
        assert_eq!(parse_order_cursor("nonsense"), None);
        assert_eq!(parse_order_cursor("12:not-a-uuid"), None);
        assert_eq!(parse_order_cursor(&format!("abc:{}", Uuid::new_v4())), None);
    }
}
