use chrono::{DateTime, Utc};
use prost_types::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zapeat_proto::{auth_service, order_service, restaurant_service};

use crate::error::ApiError;

pub fn datetime(ts: Option<Timestamp>) -> DateTime<Utc> {
    ts.and_then(|ts| DateTime::from_timestamp(ts.seconds, ts.nanos as u32))
        .unwrap_or_default()
}

fn amount(money: Option<zapeat_proto::common::Money>) -> String {
    money.map(|m| m.amount).unwrap_or_default()
}

/// Maps a wire enum value that the gateway does not know about to a 500.
fn known<T, E>(value: Result<T, E>, what: &str) -> Result<T, ApiError> {
    value.map_err(|_| ApiError::InternalError(format!("unknown {what} value")))
}

// Auth

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendCodeRequest {
    /// Phone number, `+` followed by country code and number
    pub mobile_number: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendCodeResponse {
    /// Pass back unchanged to `/auth/verify`
    pub session_token: String,
    /// The number the code was sent to, normalized
    pub mobile_number: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyRequest {
    pub mobile_number: String,
    /// The 6-digit code received by SMS
    pub security_code: String,
    pub session_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token_type: String,
    pub access_token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    RestaurantAdmin,
    RestaurantManager,
    KitchenStaff,
    CounterStaff,
}

impl From<auth_service::StaffRole> for StaffRole {
    fn from(r: auth_service::StaffRole) -> Self {
        match r {
            auth_service::StaffRole::RestaurantAdmin => StaffRole::RestaurantAdmin,
            auth_service::StaffRole::RestaurantManager => StaffRole::RestaurantManager,
            auth_service::StaffRole::KitchenStaff => StaffRole::KitchenStaff,
            auth_service::StaffRole::CounterStaff => StaffRole::CounterStaff,
        }
    }
}

impl From<StaffRole> for auth_service::StaffRole {
    fn from(r: StaffRole) -> Self {
        match r {
            StaffRole::RestaurantAdmin => auth_service::StaffRole::RestaurantAdmin,
            StaffRole::RestaurantManager => auth_service::StaffRole::RestaurantManager,
            StaffRole::KitchenStaff => auth_service::StaffRole::KitchenStaff,
            StaffRole::CounterStaff => auth_service::StaffRole::CounterStaff,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StaffMembership {
    pub restaurant_id: String,
    pub role: StaffRole,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: String,
    pub mobile_number: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub is_phone_verified: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub memberships: Vec<StaffMembership>,
}

impl TryFrom<auth_service::User> for UserProfile {
    type Error = ApiError;

    fn try_from(user: auth_service::User) -> Result<Self, Self::Error> {
        let memberships = user
            .memberships
            .into_iter()
            .map(|m| {
                Ok(StaffMembership {
                    role: known(auth_service::StaffRole::try_from(m.role), "staff role")?.into(),
                    restaurant_id: m.restaurant_id,
                    is_active: m.is_active,
                })
            })
            .collect::<Result<_, ApiError>>()?;
        Ok(UserProfile {
            id: user.id,
            mobile_number: user.mobile_number,
            email: user.email,
            name: user.name,
            is_phone_verified: user.is_phone_verified,
            is_active: user.is_active,
            date_joined: datetime(user.date_joined),
            memberships,
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    /// Blank clears the name
    pub name: Option<String>,
    /// Blank clears the email
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddStaffMemberRequest {
    /// Phone number of an existing user
    pub mobile_number: String,
    pub role: StaffRole,
}

// Restaurants

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestaurantCategory {
    Canteen,
    QuickService,
    CasualDining,
    FineDine,
}

impl From<restaurant_service::RestaurantCategory> for RestaurantCategory {
    fn from(c: restaurant_service::RestaurantCategory) -> Self {
        match c {
            restaurant_service::RestaurantCategory::Canteen => RestaurantCategory::Canteen,
            restaurant_service::RestaurantCategory::QuickService => RestaurantCategory::QuickService,
            restaurant_service::RestaurantCategory::CasualDining => RestaurantCategory::CasualDining,
            restaurant_service::RestaurantCategory::FineDine => RestaurantCategory::FineDine,
        }
    }
}

impl From<RestaurantCategory> for restaurant_service::RestaurantCategory {
    fn from(c: RestaurantCategory) -> Self {
        match c {
            RestaurantCategory::Canteen => restaurant_service::RestaurantCategory::Canteen,
            RestaurantCategory::QuickService => restaurant_service::RestaurantCategory::QuickService,
            RestaurantCategory::CasualDining => restaurant_service::RestaurantCategory::CasualDining,
            RestaurantCategory::FineDine => restaurant_service::RestaurantCategory::FineDine,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FoodType {
    Veg,
    NonVeg,
    Egg,
}

impl From<restaurant_service::FoodType> for FoodType {
    fn from(t: restaurant_service::FoodType) -> Self {
        match t {
            restaurant_service::FoodType::Veg => FoodType::Veg,
            restaurant_service::FoodType::NonVeg => FoodType::NonVeg,
            restaurant_service::FoodType::Egg => FoodType::Egg,
        }
    }
}

impl From<FoodType> for restaurant_service::FoodType {
    fn from(t: FoodType) -> Self {
        match t {
            FoodType::Veg => restaurant_service::FoodType::Veg,
            FoodType::NonVeg => restaurant_service::FoodType::NonVeg,
            FoodType::Egg => restaurant_service::FoodType::Egg,
        }
    }
}

fn food_type(value: i32) -> Result<FoodType, ApiError> {
    Ok(known(restaurant_service::FoodType::try_from(value), "food type")?.into())
}

/// One opening slot, in UTC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OpeningTime {
    /// 1 is Monday, 7 is Sunday
    pub weekday: i32,
    /// `HH:MM` or `HH:MM:SS`
    pub from_hour: String,
    pub to_hour: String,
}

impl From<restaurant_service::OpeningTime> for OpeningTime {
    fn from(t: restaurant_service::OpeningTime) -> Self {
        OpeningTime {
            weekday: t.weekday,
            from_hour: t.from_hour,
            to_hour: t.to_hour,
        }
    }
}

impl From<OpeningTime> for restaurant_service::OpeningTime {
    fn from(t: OpeningTime) -> Self {
        restaurant_service::OpeningTime {
            weekday: t.weekday,
            from_hour: t.from_hour,
            to_hour: t.to_hour,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateRestaurantRequest {
    pub name: String,
    pub category: RestaurantCategory,
    pub address: String,
    pub mobile_number: String,
    pub email: String,
    #[serde(default)]
    pub opening_times: Vec<OpeningTime>,
}

/// Replaces every field. Leaving `opening_times` empty keeps the current hours.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateRestaurantRequest {
    pub name: String,
    pub category: RestaurantCategory,
    pub address: String,
    pub mobile_number: String,
    pub email: String,
    #[serde(default)]
    pub opening_times: Vec<OpeningTime>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub category: RestaurantCategory,
    pub address: String,
    pub mobile_number: String,
    pub email: String,
    pub is_online: bool,
    pub created_at: DateTime<Utc>,
    pub opening_times: Vec<OpeningTime>,
    /// Whether the current time falls inside an opening slot
    pub is_open: bool,
}

impl TryFrom<restaurant_service::Restaurant> for Restaurant {
    type Error = ApiError;

    fn try_from(r: restaurant_service::Restaurant) -> Result<Self, Self::Error> {
        Ok(Restaurant {
            category: known(
                restaurant_service::RestaurantCategory::try_from(r.category),
                "restaurant category",
            )?
            .into(),
            id: r.id,
            name: r.name,
            address: r.address,
            mobile_number: r.mobile_number,
            email: r.email,
            is_online: r.is_online,
            created_at: datetime(r.created_at),
            opening_times: r.opening_times.into_iter().map(Into::into).collect(),
            is_open: r.is_open,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListRestaurantsResponse {
    pub restaurants: Vec<Restaurant>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetOnlineRequest {
    pub is_online: bool,
}

// Menus

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomizationOption {
    pub id: String,
    pub group_id: String,
    pub name: String,
    /// Added to the item price, per unit
    pub price: String,
    pub food_type: FoodType,
}

impl TryFrom<restaurant_service::CustomizationOption> for CustomizationOption {
    type Error = ApiError;

    fn try_from(o: restaurant_service::CustomizationOption) -> Result<Self, Self::Error> {
        Ok(CustomizationOption {
            food_type: food_type(o.food_type)?,
            id: o.id,
            group_id: o.group_id,
            name: o.name,
            price: amount(o.price),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomizationGroup {
    pub id: String,
    pub menu_item_id: String,
    pub name: String,
    pub min_options_allowed: i32,
    pub max_options_allowed: i32,
    pub options: Vec<CustomizationOption>,
}

impl TryFrom<restaurant_service::CustomizationGroup> for CustomizationGroup {
    type Error = ApiError;

    fn try_from(g: restaurant_service::CustomizationGroup) -> Result<Self, Self::Error> {
        Ok(CustomizationGroup {
            options: g
                .options
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_, _>>()?,
            id: g.id,
            menu_item_id: g.menu_item_id,
            name: g.name,
            min_options_allowed: g.min_options_allowed,
            max_options_allowed: g.max_options_allowed,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuItem {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub food_type: FoodType,
    pub customizable: bool,
    pub must_try: bool,
    pub customization_groups: Vec<CustomizationGroup>,
}

impl TryFrom<restaurant_service::MenuItem> for MenuItem {
    type Error = ApiError;

    fn try_from(i: restaurant_service::MenuItem) -> Result<Self, Self::Error> {
        Ok(MenuItem {
            food_type: food_type(i.food_type)?,
            customization_groups: i
                .customization_groups
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_, _>>()?,
            id: i.id,
            category_id: i.category_id,
            name: i.name,
            description: i.description,
            price: amount(i.price),
            customizable: i.customizable,
            must_try: i.must_try,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuCategory {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub items: Vec<MenuItem>,
}

impl TryFrom<restaurant_service::MenuCategory> for MenuCategory {
    type Error = ApiError;

    fn try_from(c: restaurant_service::MenuCategory) -> Result<Self, Self::Error> {
        Ok(MenuCategory {
            items: c
                .items
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_, _>>()?,
            id: c.id,
            name: c.name,
            description: c.description,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Menu {
    pub restaurant_id: String,
    pub categories: Vec<MenuCategory>,
}

impl TryFrom<restaurant_service::Menu> for Menu {
    type Error = ApiError;

    fn try_from(m: restaurant_service::Menu) -> Result<Self, Self::Error> {
        Ok(Menu {
            restaurant_id: m.restaurant_id,
            categories: m
                .categories
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateMenuCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateMenuItemRequest {
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Decimal amount, e.g. `"120.00"`
    pub price: String,
    pub food_type: FoodType,
    #[serde(default)]
    pub must_try: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePriceRequest {
    pub price: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCustomizationGroupRequest {
    pub menu_item_id: String,
    pub name: String,
    /// Defaults to 0
    pub min_options_allowed: Option<i32>,
    /// Defaults to 1
    pub max_options_allowed: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCustomizationOptionRequest {
    pub group_id: String,
    pub name: String,
    pub price: String,
    pub food_type: FoodType,
}

// Orders

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Received,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl From<order_service::OrderStatus> for OrderStatus {
    fn from(s: order_service::OrderStatus) -> Self {
        match s {
            order_service::OrderStatus::Received => OrderStatus::Received,
            order_service::OrderStatus::Preparing => OrderStatus::Preparing,
            order_service::OrderStatus::Ready => OrderStatus::Ready,
            order_service::OrderStatus::Completed => OrderStatus::Completed,
            order_service::OrderStatus::Cancelled => OrderStatus::Cancelled,
        }
    }
}

impl From<OrderStatus> for order_service::OrderStatus {
    fn from(s: OrderStatus) -> Self {
        match s {
            OrderStatus::Received => order_service::OrderStatus::Received,
            OrderStatus::Preparing => order_service::OrderStatus::Preparing,
            OrderStatus::Ready => order_service::OrderStatus::Ready,
            OrderStatus::Completed => order_service::OrderStatus::Completed,
            OrderStatus::Cancelled => order_service::OrderStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestaurantStatus {
    Received,
    Accepted,
    Rejected,
}

impl From<order_service::RestaurantStatus> for RestaurantStatus {
    fn from(s: order_service::RestaurantStatus) -> Self {
        match s {
            order_service::RestaurantStatus::Received => RestaurantStatus::Received,
            order_service::RestaurantStatus::Accepted => RestaurantStatus::Accepted,
            order_service::RestaurantStatus::Rejected => RestaurantStatus::Rejected,
        }
    }
}

impl From<RestaurantStatus> for order_service::RestaurantStatus {
    fn from(s: RestaurantStatus) -> Self {
        match s {
            RestaurantStatus::Received => order_service::RestaurantStatus::Received,
            RestaurantStatus::Accepted => order_service::RestaurantStatus::Accepted,
            RestaurantStatus::Rejected => order_service::RestaurantStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl From<order_service::PaymentStatus> for PaymentStatus {
    fn from(s: order_service::PaymentStatus) -> Self {
        match s {
            order_service::PaymentStatus::Pending => PaymentStatus::Pending,
            order_service::PaymentStatus::Paid => PaymentStatus::Paid,
            order_service::PaymentStatus::Failed => PaymentStatus::Failed,
            order_service::PaymentStatus::Refunded => PaymentStatus::Refunded,
        }
    }
}

impl From<PaymentStatus> for order_service::PaymentStatus {
    fn from(s: PaymentStatus) -> Self {
        match s {
            PaymentStatus::Pending => order_service::PaymentStatus::Pending,
            PaymentStatus::Paid => order_service::PaymentStatus::Paid,
            PaymentStatus::Failed => order_service::PaymentStatus::Failed,
            PaymentStatus::Refunded => order_service::PaymentStatus::Refunded,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LineItemRequest {
    pub menu_item_id: String,
    pub quantity: i32,
    pub customization_option_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<LineItemRequest>,
    pub special_instructions: Option<String>,
    pub delivery_address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: String,
    pub menu_item_id: String,
    pub name: String,
    pub quantity: i32,
    pub customization_option_id: Option<String>,
    pub customization_name: Option<String>,
    /// Line total: (item price + option price) x quantity
    pub price: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub restaurant_id: String,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub restaurant_status: RestaurantStatus,
    pub total_amount: String,
    pub special_instructions: Option<String>,
    pub delivery_address: Option<String>,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<order_service::Order> for Order {
    type Error = ApiError;

    fn try_from(o: order_service::Order) -> Result<Self, Self::Error> {
        Ok(Order {
            payment_status: known(
                order_service::PaymentStatus::try_from(o.payment_status),
                "payment status",
            )?
            .into(),
            order_status: known(
                order_service::OrderStatus::try_from(o.order_status),
                "order status",
            )?
            .into(),
            restaurant_status: known(
                order_service::RestaurantStatus::try_from(o.restaurant_status),
                "restaurant status",
            )?
            .into(),
            id: o.id,
            customer_id: o.customer_id,
            restaurant_id: o.restaurant_id,
            total_amount: amount(o.total_amount),
            special_instructions: o.special_instructions,
            delivery_address: o.delivery_address,
            items: o
                .items
                .into_iter()
                .map(|i| OrderItem {
                    id: i.id,
                    menu_item_id: i.menu_item_id,
                    name: i.name,
                    quantity: i.quantity,
                    customization_option_id: i.customization_option_id,
                    customization_name: i.customization_name,
                    price: amount(i.price),
                })
                .collect(),
            created_at: datetime(o.created_at),
            updated_at: datetime(o.updated_at),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderEdge {
    pub node: Order,
    /// Pass as `after` to fetch the next page
    pub cursor: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListOrdersResponse {
    pub edges: Vec<OrderEdge>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateRestaurantStatusRequest {
    pub status: RestaurantStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    pub status: PaymentStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Error message
    pub error: String,
    /// Per-field problems of a rejected request
    pub details: Vec<FieldError>,
}

#[cfg(test)]
mod tests {
    use zapeat_proto::common::Money;

    use super::*;

    fn money(amount: &str) -> Option<Money> {
        Some(Money {
            amount: amount.to_string(),
        })
    }

    #[test]
    fn order_is_rendered_with_items_and_statuses() {
        let order = order_service::Order {
            id: "o1".to_string(),
            customer_id: "c1".to_string(),
            restaurant_id: "r1".to_string(),
            payment_status: order_service::PaymentStatus::Pending as i32,
            order_status: order_service::OrderStatus::Preparing as i32,
            restaurant_status: order_service::RestaurantStatus::Accepted as i32,
            total_amount: money("240.00"),
            items: vec![order_service::OrderItem {
                id: "i1".to_string(),
                menu_item_id: "m1".to_string(),
                name: "Burger".to_string(),
                quantity: 2,
                customization_option_id: Some("x1".to_string()),
                customization_name: Some("Extra Cheese".to_string()),
                price: money("240.00"),
            }],
            created_at: Some(Timestamp {
                seconds: 1_735_689_600,
                nanos: 0,
            }),
            ..Default::default()
        };

        let order = Order::try_from(order).unwrap();
        assert_eq!(order.order_status, OrderStatus::Preparing);
        assert_eq!(order.total_amount, "240.00");
        assert_eq!(order.items[0].customization_name.as_deref(), Some("Extra Cheese"));
        assert_eq!(order.created_at.timestamp(), 1_735_689_600);

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["order_status"], "PREPARING");
        assert_eq!(json["restaurant_status"], "ACCEPTED");
    }

    #[test]
    fn unknown_enum_values_are_internal_errors() {
        let order = order_service::Order {
            order_status: 99,
            ..Default::default()
        };
        assert!(matches!(
            Order::try_from(order),
            Err(ApiError::InternalError(_))
        ));
    }

    #[test]
    fn restaurant_carries_opening_times() {
        let restaurant = restaurant_service::Restaurant {
            id: "r1".to_string(),
            name: "Burger Barn".to_string(),
            category: restaurant_service::RestaurantCategory::QuickService as i32,
            opening_times: vec![restaurant_service::OpeningTime {
                weekday: 1,
                from_hour: "09:00:00".to_string(),
                to_hour: "22:00:00".to_string(),
            }],
            is_open: true,
            ..Default::default()
        };

        let json = serde_json::to_value(Restaurant::try_from(restaurant).unwrap()).unwrap();
        assert_eq!(json["category"], "QUICK_SERVICE");
        assert_eq!(json["is_open"], true);
        assert_eq!(json["opening_times"][0]["from_hour"], "09:00:00");

        let request: UpdateRestaurantRequest = serde_json::from_str(
            r#"{"name":"Burger Barn","category":"CANTEEN","address":"MG Road","mobile_number":"+919876543210","email":"a@b.in"}"#,
        )
        .unwrap();
        assert!(request.opening_times.is_empty());
    }

    #[test]
    fn enums_use_screaming_snake_case() {
        let request: CreateMenuItemRequest = serde_json::from_str(
            r#"{"category_id":"c","name":"Omelette","price":"60.00","food_type":"EGG"}"#,
        )
        .unwrap();
        assert_eq!(request.food_type, FoodType::Egg);
        assert!(!request.must_try);
        assert_eq!(
            serde_json::to_value(StaffRole::RestaurantAdmin).unwrap(),
            "RESTAURANT_ADMIN"
        );
    }
}
