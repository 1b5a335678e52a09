use std::io::Write;

use chrono::{DateTime, Utc};
use diesel::{
    deserialize::FromSql, deserialize::FromSqlRow, expression::AsExpression, prelude::*,
    serialize::ToSql,
};
use uuid::Uuid;
use zapeat_proto::auth_service as proto;

use crate::schema::{staff_memberships, users};

#[derive(Queryable, Selectable, Identifiable, Insertable, Clone, Debug, PartialEq)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub mobile_number: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub is_phone_verified: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

/// Outer `None` leaves the column alone, `Some(None)` clears it.
#[derive(AsChangeset, Default, Debug, PartialEq)]
#[diesel(table_name = users)]
pub struct ProfileChanges {
    pub name: Option<Option<String>>,
    pub email: Option<Option<String>>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Clone, Debug, PartialEq)]
#[diesel(belongs_to(User))]
#[diesel(table_name = staff_memberships, primary_key(user_id, restaurant_id))]
pub struct StaffMembership {
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub role: StaffRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(FromSqlRow, AsExpression, PartialEq, Eq, Hash, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::StaffRole)]
pub enum StaffRole {
    RestaurantAdmin,
    RestaurantManager,
    KitchenStaff,
    CounterStaff,
}

impl ToSql<crate::schema::sql_types::StaffRole, diesel::pg::Pg> for StaffRole {
    fn to_sql<'b>(
        &'b self,
        out: &mut diesel::serialize::Output<'b, '_, diesel::pg::Pg>,
    ) -> diesel::serialize::Result {
        match *self {
            StaffRole::RestaurantAdmin => out.write_all(b"RESTAURANT_ADMIN")?,
            StaffRole::RestaurantManager => out.write_all(b"RESTAURANT_MANAGER")?,
            StaffRole::KitchenStaff => out.write_all(b"KITCHEN_STAFF")?,
            StaffRole::CounterStaff => out.write_all(b"COUNTER_STAFF")?,
        }
        Ok(diesel::serialize::IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::StaffRole, diesel::pg::Pg> for StaffRole {
    fn from_sql(bytes: diesel::pg::PgValue<'_>) -> diesel::deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"RESTAURANT_ADMIN" => Ok(StaffRole::RestaurantAdmin),
            b"RESTAURANT_MANAGER" => Ok(StaffRole::RestaurantManager),
            b"KITCHEN_STAFF" => Ok(StaffRole::KitchenStaff),
            b"COUNTER_STAFF" => Ok(StaffRole::CounterStaff),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl From<proto::StaffRole> for StaffRole {
    fn from(r: proto::StaffRole) -> Self {
        match r {
            proto::StaffRole::RestaurantAdmin => StaffRole::RestaurantAdmin,
            proto::StaffRole::RestaurantManager => StaffRole::RestaurantManager,
            proto::StaffRole::KitchenStaff => StaffRole::KitchenStaff,
            proto::StaffRole::CounterStaff => StaffRole::CounterStaff,
        }
    }
}

impl From<StaffRole> for proto::StaffRole {
    fn from(r: StaffRole) -> Self {
        match r {
            StaffRole::RestaurantAdmin => proto::StaffRole::RestaurantAdmin,
            StaffRole::RestaurantManager => proto::StaffRole::RestaurantManager,
            StaffRole::KitchenStaff => proto::StaffRole::KitchenStaff,
            StaffRole::CounterStaff => proto::StaffRole::CounterStaff,
        }
    }
}
