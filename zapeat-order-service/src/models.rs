use std::io::Write;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::{
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    pg::{Pg, PgValue},
    prelude::*,
    serialize::{self, IsNull, Output, ToSql},
};
use uuid::Uuid;
use zapeat_proto::order_service as proto;

use crate::schema::{
    order_items, orders, restaurant_customization_options, restaurant_menu_items, restaurants,
};

#[derive(FromSqlRow, AsExpression, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::OrderStatus)]
pub enum OrderStatus {
    Received,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Completed and cancelled orders are closed for further status changes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl ToSql<crate::schema::sql_types::OrderStatus, Pg> for OrderStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            OrderStatus::Received => out.write_all(b"RECEIVED")?,
            OrderStatus::Preparing => out.write_all(b"PREPARING")?,
            OrderStatus::Ready => out.write_all(b"READY")?,
            OrderStatus::Completed => out.write_all(b"COMPLETED")?,
            OrderStatus::Cancelled => out.write_all(b"CANCELLED")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::OrderStatus, Pg> for OrderStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"RECEIVED" => Ok(OrderStatus::Received),
            b"PREPARING" => Ok(OrderStatus::Preparing),
            b"READY" => Ok(OrderStatus::Ready),
            b"COMPLETED" => Ok(OrderStatus::Completed),
            b"CANCELLED" => Ok(OrderStatus::Cancelled),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl From<proto::OrderStatus> for OrderStatus {
    fn from(s: proto::OrderStatus) -> Self {
        match s {
            proto::OrderStatus::Received => OrderStatus::Received,
            proto::OrderStatus::Preparing => OrderStatus::Preparing,
            proto::OrderStatus::Ready => OrderStatus::Ready,
            proto::OrderStatus::Completed => OrderStatus::Completed,
            proto::OrderStatus::Cancelled => OrderStatus::Cancelled,
        }
    }
}

impl From<OrderStatus> for proto::OrderStatus {
    fn from(s: OrderStatus) -> Self {
        match s {
            OrderStatus::Received => proto::OrderStatus::Received,
            OrderStatus::Preparing => proto::OrderStatus::Preparing,
            OrderStatus::Ready => proto::OrderStatus::Ready,
            OrderStatus::Completed => proto::OrderStatus::Completed,
            OrderStatus::Cancelled => proto::OrderStatus::Cancelled,
        }
    }
}

#[derive(FromSqlRow, AsExpression, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::RestaurantStatus)]
pub enum RestaurantStatus {
    Received,
    Accepted,
    Rejected,
}

impl ToSql<crate::schema::sql_types::RestaurantStatus, Pg> for RestaurantStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            RestaurantStatus::Received => out.write_all(b"RECEIVED")?,
            RestaurantStatus::Accepted => out.write_all(b"ACCEPTED")?,
            RestaurantStatus::Rejected => out.write_all(b"REJECTED")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::RestaurantStatus, Pg> for RestaurantStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"RECEIVED" => Ok(RestaurantStatus::Received),
            b"ACCEPTED" => Ok(RestaurantStatus::Accepted),
            b"REJECTED" => Ok(RestaurantStatus::Rejected),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl From<proto::RestaurantStatus> for RestaurantStatus {
    fn from(s: proto::RestaurantStatus) -> Self {
        match s {
            proto::RestaurantStatus::Received => RestaurantStatus::Received,
            proto::RestaurantStatus::Accepted => RestaurantStatus::Accepted,
            proto::RestaurantStatus::Rejected => RestaurantStatus::Rejected,
        }
    }
}

impl From<RestaurantStatus> for proto::RestaurantStatus {
    fn from(s: RestaurantStatus) -> Self {
        match s {
            RestaurantStatus::Received => proto::RestaurantStatus::Received,
            RestaurantStatus::Accepted => proto::RestaurantStatus::Accepted,
            RestaurantStatus::Rejected => proto::RestaurantStatus::Rejected,
        }
    }
}

#[derive(FromSqlRow, AsExpression, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::PaymentStatus)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl ToSql<crate::schema::sql_types::PaymentStatus, Pg> for PaymentStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            PaymentStatus::Pending => out.write_all(b"PENDING")?,
            PaymentStatus::Paid => out.write_all(b"PAID")?,
            PaymentStatus::Failed => out.write_all(b"FAILED")?,
            PaymentStatus::Refunded => out.write_all(b"REFUNDED")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::PaymentStatus, Pg> for PaymentStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"PENDING" => Ok(PaymentStatus::Pending),
            b"PAID" => Ok(PaymentStatus::Paid),
            b"FAILED" => Ok(PaymentStatus::Failed),
            b"REFUNDED" => Ok(PaymentStatus::Refunded),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl From<proto::PaymentStatus> for PaymentStatus {
    fn from(s: proto::PaymentStatus) -> Self {
        match s {
            proto::PaymentStatus::Pending => PaymentStatus::Pending,
            proto::PaymentStatus::Paid => PaymentStatus::Paid,
            proto::PaymentStatus::Failed => PaymentStatus::Failed,
            proto::PaymentStatus::Refunded => PaymentStatus::Refunded,
        }
    }
}

impl From<PaymentStatus> for proto::PaymentStatus {
    fn from(s: PaymentStatus) -> Self {
        match s {
            PaymentStatus::Pending => proto::PaymentStatus::Pending,
            PaymentStatus::Paid => proto::PaymentStatus::Paid,
            PaymentStatus::Failed => proto::PaymentStatus::Failed,
            PaymentStatus::Refunded => proto::PaymentStatus::Refunded,
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Clone, Debug, PartialEq)]
#[diesel(table_name = orders)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub total_amount: BigDecimal,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub restaurant_status: RestaurantStatus,
    pub special_instructions: Option<String>,
    pub delivery_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A priced line of an order. `price` is the line total fixed at creation.
#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Clone, Debug, PartialEq)]
#[diesel(belongs_to(Order))]
#[diesel(table_name = order_items)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub name: String,
    pub customization_option_id: Option<Uuid>,
    pub customization_name: Option<String>,
    pub quantity: i32,
    pub price: BigDecimal,
}

#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, Clone, Debug, PartialEq)]
#[diesel(table_name = restaurants)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Clone, Debug, PartialEq)]
#[diesel(belongs_to(Restaurant))]
#[diesel(table_name = restaurant_menu_items)]
pub struct RestaurantMenuItem {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub price: BigDecimal,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Clone, Debug, PartialEq)]
#[diesel(belongs_to(RestaurantMenuItem, foreign_key = menu_item_id))]
#[diesel(table_name = restaurant_customization_options)]
pub struct RestaurantCustomizationOption {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub name: String,
    pub price: BigDecimal,
}
