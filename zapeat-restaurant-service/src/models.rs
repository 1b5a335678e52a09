use std::io::Write;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveTime, Utc};
use diesel::{
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    pg::{Pg, PgValue},
    prelude::*,
    serialize::{self, IsNull, Output, ToSql},
};
use uuid::Uuid;
use zapeat_proto::restaurant_service as proto;

use crate::schema::{
    customization_groups, customization_options, menu_categories, menu_items, opening_times,
    outbox, restaurants,
};

#[derive(FromSqlRow, AsExpression, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::RestaurantCategory)]
pub enum RestaurantCategory {
    Canteen,
    QuickService,
    CasualDining,
    FineDine,
}

impl ToSql<crate::schema::sql_types::RestaurantCategory, Pg> for RestaurantCategory {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            RestaurantCategory::Canteen => out.write_all(b"CANTEEN")?,
            RestaurantCategory::QuickService => out.write_all(b"QUICK_SERVICE")?,
            RestaurantCategory::CasualDining => out.write_all(b"CASUAL_DINING")?,
            RestaurantCategory::FineDine => out.write_all(b"FINE_DINE")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::RestaurantCategory, Pg> for RestaurantCategory {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"CANTEEN" => Ok(RestaurantCategory::Canteen),
            b"QUICK_SERVICE" => Ok(RestaurantCategory::QuickService),
            b"CASUAL_DINING" => Ok(RestaurantCategory::CasualDining),
            b"FINE_DINE" => Ok(RestaurantCategory::FineDine),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl From<proto::RestaurantCategory> for RestaurantCategory {
    fn from(c: proto::RestaurantCategory) -> Self {
        match c {
            proto::RestaurantCategory::Canteen => RestaurantCategory::Canteen,
            proto::RestaurantCategory::QuickService => RestaurantCategory::QuickService,
            proto::RestaurantCategory::CasualDining => RestaurantCategory::CasualDining,
            proto::RestaurantCategory::FineDine => RestaurantCategory::FineDine,
        }
    }
}

impl From<RestaurantCategory> for proto::RestaurantCategory {
    fn from(c: RestaurantCategory) -> Self {
        match c {
            RestaurantCategory::Canteen => proto::RestaurantCategory::Canteen,
            RestaurantCategory::QuickService => proto::RestaurantCategory::QuickService,
            RestaurantCategory::CasualDining => proto::RestaurantCategory::CasualDining,
            RestaurantCategory::FineDine => proto::RestaurantCategory::FineDine,
        }
    }
}

#[derive(FromSqlRow, AsExpression, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::FoodType)]
pub enum FoodType {
    Veg,
    NonVeg,
    Egg,
}

impl ToSql<crate::schema::sql_types::FoodType, Pg> for FoodType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            FoodType::Veg => out.write_all(b"VEG")?,
            FoodType::NonVeg => out.write_all(b"NON_VEG")?,
            FoodType::Egg => out.write_all(b"EGG")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::FoodType, Pg> for FoodType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"VEG" => Ok(FoodType::Veg),
            b"NON_VEG" => Ok(FoodType::NonVeg),
            b"EGG" => Ok(FoodType::Egg),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl From<proto::FoodType> for FoodType {
    fn from(t: proto::FoodType) -> Self {
        match t {
            proto::FoodType::Veg => FoodType::Veg,
            proto::FoodType::NonVeg => FoodType::NonVeg,
            proto::FoodType::Egg => FoodType::Egg,
        }
    }
}

impl From<FoodType> for proto::FoodType {
    fn from(t: FoodType) -> Self {
        match t {
            FoodType::Veg => proto::FoodType::Veg,
            FoodType::NonVeg => proto::FoodType::NonVeg,
            FoodType::Egg => proto::FoodType::Egg,
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Clone, Debug, PartialEq)]
#[diesel(table_name = restaurants)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub category: RestaurantCategory,
    pub address: String,
    pub mobile_number: String,
    pub email: String,
    pub is_online: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields an update replaces wholesale.
#[derive(AsChangeset, Debug, PartialEq)]
#[diesel(table_name = restaurants)]
pub struct RestaurantChanges {
    pub name: String,
    pub category: RestaurantCategory,
    pub address: String,
    pub mobile_number: String,
    pub email: String,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Clone, Debug, PartialEq)]
#[diesel(belongs_to(Restaurant))]
#[diesel(table_name = opening_times)]
pub struct OpeningTime {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub weekday: i16,
    pub from_hour: NaiveTime,
    pub to_hour: NaiveTime,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Clone, Debug, PartialEq)]
#[diesel(belongs_to(Restaurant))]
#[diesel(table_name = menu_categories)]
pub struct MenuCategory {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Clone, Debug, PartialEq)]
#[diesel(belongs_to(MenuCategory, foreign_key = category_id))]
#[diesel(table_name = menu_items)]
pub struct MenuItem {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub food_type: FoodType,
    pub customizable: bool,
    pub must_try: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Clone, Debug, PartialEq)]
#[diesel(belongs_to(MenuItem))]
#[diesel(table_name = customization_groups)]
pub struct CustomizationGroup {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub name: String,
    pub min_options_allowed: i32,
    pub max_options_allowed: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Clone, Debug, PartialEq)]
#[diesel(belongs_to(CustomizationGroup, foreign_key = group_id))]
#[diesel(table_name = customization_options)]
pub struct CustomizationOption {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub food_type: FoodType,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug, PartialEq)]
#[diesel(table_name = outbox)]
pub struct Outbox {
    pub id: i32,
    pub topic: String,
    pub key: String,
    pub value: Vec<u8>,
}

#[derive(Insertable, Debug, PartialEq)]
#[diesel(table_name = outbox)]
pub struct NewOutbox {
    pub topic: String,
    pub key: String,
    pub value: Vec<u8>,
}
