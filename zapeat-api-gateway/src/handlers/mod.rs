pub mod auth;
pub mod order;
pub mod profile;
pub mod restaurant;

pub use auth::router as auth_router;
pub use order::router as order_router;
pub use profile::router as profile_router;
pub use restaurant::router as restaurant_router;

use axum::http::HeaderMap;
use tonic::{Code, transport::Channel};
use utoipa::OpenApi;
use zapeat_proto::{
    auth_service::{
        GetTokenInfoPayload, GetUserPayload, StaffRole, User, auth_service_client::AuthServiceClient,
    },
    order_service::order_service_client::OrderServiceClient,
    restaurant_service::restaurant_service_client::RestaurantServiceClient,
};

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub auth_client: AuthServiceClient<Channel>,
    pub restaurant_client: RestaurantServiceClient<Channel>,
    pub order_client: OrderServiceClient<Channel>,
}

/// Any active membership of the restaurant.
const ANY_STAFF: &[StaffRole] = &[];
const MENU_EDITORS: &[StaffRole] = &[StaffRole::RestaurantAdmin, StaffRole::RestaurantManager];
const ADMINS: &[StaffRole] = &[StaffRole::RestaurantAdmin];

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or(ApiError::AuthenticationFailed)?
        .to_str()
        .map_err(|_| ApiError::InvalidToken)?;

    auth_header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::InvalidToken)
}

async fn extract_user_id_from_token(
    headers: &HeaderMap,
    auth_client: &mut AuthServiceClient<Channel>,
) -> Result<String, ApiError> {
    let token = bearer_token(headers)?;

    let request = tonic::Request::new(GetTokenInfoPayload {
        token: token.to_string(),
    });

    let response = auth_client.get_token_info(request).await.map_err(|e| {
        if e.code() == Code::Unavailable {
            ApiError::ServiceUnavailable(format!("Auth service error: {e}"))
        } else {
            ApiError::InvalidToken
        }
    })?;

    Ok(response.into_inner().user_id)
}

async fn current_user(
    headers: &HeaderMap,
    auth_client: &mut AuthServiceClient<Channel>,
) -> Result<User, ApiError> {
    let user_id = extract_user_id_from_token(headers, auth_client).await?;

    let request = tonic::Request::new(GetUserPayload { id: user_id });
    let response = auth_client.get_user(request).await?;
    Ok(response.into_inner())
}

/// Whether `user` is active staff of the restaurant in one of `allowed`
/// roles. An empty `allowed` accepts every role.
fn has_role(user: &User, restaurant_id: &str, allowed: &[StaffRole]) -> bool {
    user.memberships.iter().any(|m| {
        m.is_active
            && m.restaurant_id == restaurant_id
            && (allowed.is_empty() || allowed.iter().any(|role| *role as i32 == m.role))
    })
}

async fn verify_restaurant_access(
    headers: &HeaderMap,
    auth_client: &mut AuthServiceClient<Channel>,
    restaurant_id: &str,
    allowed: &[StaffRole],
) -> Result<User, ApiError> {
    let user = current_user(headers, auth_client).await?;

    if has_role(&user, restaurant_id, allowed) {
        Ok(user)
    } else {
        Err(ApiError::Forbidden)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::send_code,
        auth::verify,
        profile::get_profile,
        profile::update_profile,
        restaurant::create_restaurant,
        restaurant::list_restaurants,
        restaurant::get_restaurant,
        restaurant::update_restaurant,
        restaurant::delete_restaurant,
        restaurant::set_online,
        restaurant::get_menu,
        restaurant::create_category,
        restaurant::create_menu_item,
        restaurant::update_menu_item_price,
        restaurant::create_customization_group,
        restaurant::create_customization_option,
        restaurant::add_staff_member,
        order::create_order,
        order::list_restaurant_orders,
        order::list_my_orders,
        order::get_order,
        order::update_order_status,
        order::update_restaurant_status,
        order::update_payment_status,
    ),
    components(
        schemas(
            crate::models::SendCodeRequest,
            crate::models::SendCodeResponse,
            crate::models::VerifyRequest,
            crate::models::TokenResponse,
            crate::models::StaffRole,
            crate::models::StaffMembership,
            crate::models::UserProfile,
            crate::models::UpdateProfileRequest,
            crate::models::AddStaffMemberRequest,
            crate::models::RestaurantCategory,
            crate::models::FoodType,
            crate::models::OpeningTime,
            crate::models::CreateRestaurantRequest,
            crate::models::UpdateRestaurantRequest,
            crate::models::Restaurant,
            crate::models::ListRestaurantsResponse,
            crate::models::SetOnlineRequest,
            crate::models::CustomizationOption,
            crate::models::CustomizationGroup,
            crate::models::MenuItem,
            crate::models::MenuCategory,
            crate::models::Menu,
            crate::models::CreateMenuCategoryRequest,
            crate::models::CreateMenuItemRequest,
            crate::models::UpdatePriceRequest,
            crate::models::CreateCustomizationGroupRequest,
            crate::models::CreateCustomizationOptionRequest,
            crate::models::OrderStatus,
            crate::models::RestaurantStatus,
            crate::models::PaymentStatus,
            crate::models::LineItemRequest,
            crate::models::CreateOrderRequest,
            crate::models::OrderItem,
            crate::models::Order,
            crate::models::OrderEdge,
            crate::models::ListOrdersResponse,
            crate::models::UpdateOrderStatusRequest,
            crate::models::UpdateRestaurantStatusRequest,
            crate::models::UpdatePaymentStatusRequest,
            crate::models::FieldError,
            crate::models::ApiErrorResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Phone verification and tokens"),
        (name = "users", description = "Profile of the signed-in user"),
        (name = "restaurants", description = "Restaurants, menus and staff"),
        (name = "orders", description = "Order placement and tracking")
    ),
    info(
        title = "Zapeat API Gateway",
        description = "HTTP API for the Zapeat food ordering services",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            use utoipa::openapi::security::*;
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
