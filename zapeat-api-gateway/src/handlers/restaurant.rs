use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post, put},
};
use tonic::transport::Channel;
use tracing::{info, instrument};
use zapeat_proto::{
    auth_service::{self, AddStaffMemberPayload},
    common::Money,
    restaurant_service::{
        self as proto, CreateCustomizationGroupPayload, CreateCustomizationOptionPayload,
        CreateMenuCategoryPayload, CreateMenuItemPayload, CreateRestaurantPayload, GetMenuPayload,
        DeleteRestaurantPayload, GetRestaurantPayload, SetRestaurantOnlinePayload,
        UpdateMenuItemPricePayload, UpdateRestaurantPayload,
        restaurant_service_client::RestaurantServiceClient,
    },
};

use crate::error::ApiError;
use crate::models::*;

use super::{
    ADMINS, AppState, MENU_EDITORS, current_user, extract_user_id_from_token,
    verify_restaurant_access,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants", post(create_restaurant).get(list_restaurants))
        .route(
            "/restaurants/{id}",
            get(get_restaurant)
                .put(update_restaurant)
                .delete(delete_restaurant),
        )
        .route("/restaurants/{id}/online", put(set_online))
        .route("/restaurants/{id}/menu", get(get_menu))
        .route("/restaurants/{id}/categories", post(create_category))
        .route("/restaurants/{id}/items", post(create_menu_item))
        .route(
            "/restaurants/{id}/items/{item_id}/price",
            put(update_menu_item_price),
        )
        .route(
            "/restaurants/{id}/customization-groups",
            post(create_customization_group),
        )
        .route(
            "/restaurants/{id}/customization-options",
            post(create_customization_option),
        )
        .route("/restaurants/{id}/staff", post(add_staff_member))
}

async fn fetch_menu(
    client: &mut RestaurantServiceClient<Channel>,
    restaurant_id: &str,
) -> Result<proto::Menu, ApiError> {
    let request = tonic::Request::new(GetMenuPayload {
        restaurant_id: restaurant_id.to_string(),
    });
    Ok(client.get_menu(request).await?.into_inner())
}

fn menu_items(menu: &proto::Menu) -> impl Iterator<Item = &proto::MenuItem> {
    menu.categories.iter().flat_map(|c| c.items.iter())
}

fn has_category(menu: &proto::Menu, category_id: &str) -> bool {
    menu.categories.iter().any(|c| c.id == category_id)
}

fn has_menu_item(menu: &proto::Menu, menu_item_id: &str) -> bool {
    menu_items(menu).any(|i| i.id == menu_item_id)
}

fn has_customization_group(menu: &proto::Menu, group_id: &str) -> bool {
    menu_items(menu)
        .flat_map(|i| i.customization_groups.iter())
        .any(|g| g.id == group_id)
}

/// Rejects ids that exist but belong to another restaurant's menu.
fn ensure_in_menu(found: bool, what: &str) -> Result<(), ApiError> {
    if found {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("{what} not found")))
    }
}

#[utoipa::path(
    post,
    path = "/restaurants",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 201, description = "Restaurant created, caller is its admin", body = Restaurant),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 422, description = "Invalid restaurant fields", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state, headers))]
pub async fn create_restaurant(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateRestaurantRequest>,
) -> Result<(StatusCode, Json<Restaurant>), ApiError> {
    let mut auth_client = state.auth_client.clone();
    let user = current_user(&headers, &mut auth_client).await?;

    let mut restaurant_client = state.restaurant_client.clone();

    let request = tonic::Request::new(CreateRestaurantPayload {
        name: payload.name,
        category: proto::RestaurantCategory::from(payload.category) as i32,
        address: payload.address,
        mobile_number: payload.mobile_number,
        email: payload.email,
        opening_times: payload.opening_times.into_iter().map(Into::into).collect(),
    });

    let restaurant = restaurant_client
        .create_restaurant(request)
        .await?
        .into_inner();

    let grant_request = tonic::Request::new(AddStaffMemberPayload {
        mobile_number: user.mobile_number,
        restaurant_id: restaurant.id.clone(),
        role: auth_service::StaffRole::RestaurantAdmin as i32,
    });

    auth_client.add_staff_member(grant_request).await?;
    info!(restaurant_id = %restaurant.id, user_id = %user.id, "restaurant admin granted");

    Ok((StatusCode::CREATED, Json(restaurant.try_into()?)))
}

#[utoipa::path(
    get,
    path = "/restaurants",
    responses(
        (status = 200, description = "All restaurants", body = ListRestaurantsResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state, headers))]
pub async fn list_restaurants(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ListRestaurantsResponse>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    extract_user_id_from_token(&headers, &mut auth_client).await?;

    let mut restaurant_client = state.restaurant_client.clone();
    let response = restaurant_client
        .list_restaurants(tonic::Request::new(()))
        .await?
        .into_inner();

    Ok(Json(ListRestaurantsResponse {
        restaurants: response
            .restaurants
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()?,
    }))
}

#[utoipa::path(
    get,
    path = "/restaurants/{id}",
    params(
        ("id" = String, Path, description = "Restaurant ID")
    ),
    responses(
        (status = 200, description = "Restaurant details", body = Restaurant),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state, headers))]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Restaurant>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    extract_user_id_from_token(&headers, &mut auth_client).await?;

    let mut restaurant_client = state.restaurant_client.clone();
    let request = tonic::Request::new(GetRestaurantPayload { restaurant_id: id });
    let restaurant = restaurant_client.get_restaurant(request).await?.into_inner();

    Ok(Json(restaurant.try_into()?))
}

#[utoipa::path(
    put,
    path = "/restaurants/{id}",
    params(
        ("id" = String, Path, description = "Restaurant ID")
    ),
    request_body = UpdateRestaurantRequest,
    responses(
        (status = 200, description = "Restaurant updated", body = Restaurant),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Not an admin of the restaurant", body = ApiErrorResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
        (status = 422, description = "Invalid restaurant fields", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state, headers))]
pub async fn update_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<UpdateRestaurantRequest>,
) -> Result<Json<Restaurant>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    verify_restaurant_access(&headers, &mut auth_client, &id, ADMINS).await?;

    let mut restaurant_client = state.restaurant_client.clone();
    let request = tonic::Request::new(UpdateRestaurantPayload {
        restaurant_id: id,
        name: payload.name,
        category: proto::RestaurantCategory::from(payload.category) as i32,
        address: payload.address,
        mobile_number: payload.mobile_number,
        email: payload.email,
        opening_times: payload.opening_times.into_iter().map(Into::into).collect(),
    });
    let restaurant = restaurant_client
        .update_restaurant(request)
        .await?
        .into_inner();

    Ok(Json(restaurant.try_into()?))
}

#[utoipa::path(
    delete,
    path = "/restaurants/{id}",
    params(
        ("id" = String, Path, description = "Restaurant ID")
    ),
    responses(
        (status = 204, description = "Restaurant and its menu deleted"),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Not an admin of the restaurant", body = ApiErrorResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state, headers))]
pub async fn delete_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let user = verify_restaurant_access(&headers, &mut auth_client, &id, ADMINS).await?;

    let mut restaurant_client = state.restaurant_client.clone();
    let request = tonic::Request::new(DeleteRestaurantPayload {
        restaurant_id: id.clone(),
    });
    restaurant_client.delete_restaurant(request).await?;
    info!(restaurant_id = %id, user_id = %user.id, "restaurant deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/restaurants/{id}/online",
    params(
        ("id" = String, Path, description = "Restaurant ID")
    ),
    request_body = SetOnlineRequest,
    responses(
        (status = 200, description = "Online flag updated", body = Restaurant),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Not an admin or manager of the restaurant", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state, headers))]
pub async fn set_online(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<SetOnlineRequest>,
) -> Result<Json<Restaurant>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    verify_restaurant_access(&headers, &mut auth_client, &id, MENU_EDITORS).await?;

    let mut restaurant_client = state.restaurant_client.clone();
    let request = tonic::Request::new(SetRestaurantOnlinePayload {
        restaurant_id: id,
        is_online: payload.is_online,
    });
    let restaurant = restaurant_client
        .set_restaurant_online(request)
        .await?
        .into_inner();

    Ok(Json(restaurant.try_into()?))
}

#[utoipa::path(
    get,
    path = "/restaurants/{id}/menu",
    params(
        ("id" = String, Path, description = "Restaurant ID")
    ),
    responses(
        (status = 200, description = "Menu tree of the restaurant", body = Menu),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state, headers))]
pub async fn get_menu(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Menu>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    extract_user_id_from_token(&headers, &mut auth_client).await?;

    let mut restaurant_client = state.restaurant_client.clone();
    let menu = fetch_menu(&mut restaurant_client, &id).await?;

    Ok(Json(menu.try_into()?))
}

#[utoipa::path(
    post,
    path = "/restaurants/{id}/categories",
    params(
        ("id" = String, Path, description = "Restaurant ID")
    ),
    request_body = CreateMenuCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = MenuCategory),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Not an admin or manager of the restaurant", body = ApiErrorResponse),
        (status = 422, description = "Invalid category fields", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state, headers))]
pub async fn create_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<CreateMenuCategoryRequest>,
) -> Result<(StatusCode, Json<MenuCategory>), ApiError> {
    let mut auth_client = state.auth_client.clone();
    verify_restaurant_access(&headers, &mut auth_client, &id, MENU_EDITORS).await?;

    let mut restaurant_client = state.restaurant_client.clone();
    let request = tonic::Request::new(CreateMenuCategoryPayload {
        restaurant_id: id,
        name: payload.name,
        description: payload.description,
    });
    let category = restaurant_client
        .create_menu_category(request)
        .await?
        .into_inner();

    Ok((StatusCode::CREATED, Json(category.try_into()?)))
}

#[utoipa::path(
    post,
    path = "/restaurants/{id}/items",
    params(
        ("id" = String, Path, description = "Restaurant ID")
    ),
    request_body = CreateMenuItemRequest,
    responses(
        (status = 201, description = "Menu item created", body = MenuItem),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Not an admin or manager of the restaurant", body = ApiErrorResponse),
        (status = 404, description = "Category not found in this restaurant", body = ApiErrorResponse),
        (status = 422, description = "Invalid menu item fields", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state, headers))]
pub async fn create_menu_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<CreateMenuItemRequest>,
) -> Result<(StatusCode, Json<MenuItem>), ApiError> {
    let mut auth_client = state.auth_client.clone();
    verify_restaurant_access(&headers, &mut auth_client, &id, MENU_EDITORS).await?;

    let mut restaurant_client = state.restaurant_client.clone();
    let menu = fetch_menu(&mut restaurant_client, &id).await?;
    ensure_in_menu(has_category(&menu, &payload.category_id), "Menu category")?;

    let request = tonic::Request::new(CreateMenuItemPayload {
        category_id: payload.category_id,
        name: payload.name,
        description: payload.description,
        price: Some(Money {
            amount: payload.price,
        }),
        food_type: proto::FoodType::from(payload.food_type) as i32,
        must_try: payload.must_try,
    });
    let item = restaurant_client
        .create_menu_item(request)
        .await?
        .into_inner();

    Ok((StatusCode::CREATED, Json(item.try_into()?)))
}

#[utoipa::path(
    put,
    path = "/restaurants/{id}/items/{item_id}/price",
    params(
        ("id" = String, Path, description = "Restaurant ID"),
        ("item_id" = String, Path, description = "Menu item ID")
    ),
    request_body = UpdatePriceRequest,
    responses(
        (status = 200, description = "Price updated; existing orders keep their prices", body = MenuItem),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Not an admin or manager of the restaurant", body = ApiErrorResponse),
        (status = 404, description = "Menu item not found in this restaurant", body = ApiErrorResponse),
        (status = 422, description = "Invalid price", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state, headers))]
pub async fn update_menu_item_price(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(payload): Json<UpdatePriceRequest>,
) -> Result<Json<MenuItem>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    verify_restaurant_access(&headers, &mut auth_client, &id, MENU_EDITORS).await?;

    let mut restaurant_client = state.restaurant_client.clone();
    let menu = fetch_menu(&mut restaurant_client, &id).await?;
    ensure_in_menu(has_menu_item(&menu, &item_id), "Menu item")?;

    let request = tonic::Request::new(UpdateMenuItemPricePayload {
        menu_item_id: item_id,
        price: Some(Money {
            amount: payload.price,
        }),
    });
    let item = restaurant_client
        .update_menu_item_price(request)
        .await?
        .into_inner();

    Ok(Json(item.try_into()?))
}

#[utoipa::path(
    post,
    path = "/restaurants/{id}/customization-groups",
    params(
        ("id" = String, Path, description = "Restaurant ID")
    ),
    request_body = CreateCustomizationGroupRequest,
    responses(
        (status = 201, description = "Customization group created", body = CustomizationGroup),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Not an admin or manager of the restaurant", body = ApiErrorResponse),
        (status = 404, description = "Menu item not found in this restaurant", body = ApiErrorResponse),
        (status = 422, description = "Invalid group bounds", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state, headers))]
pub async fn create_customization_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<CreateCustomizationGroupRequest>,
) -> Result<(StatusCode, Json<CustomizationGroup>), ApiError> {
    let mut auth_client = state.auth_client.clone();
    verify_restaurant_access(&headers, &mut auth_client, &id, MENU_EDITORS).await?;

    let mut restaurant_client = state.restaurant_client.clone();
    let menu = fetch_menu(&mut restaurant_client, &id).await?;
    ensure_in_menu(has_menu_item(&menu, &payload.menu_item_id), "Menu item")?;

    let request = tonic::Request::new(CreateCustomizationGroupPayload {
        menu_item_id: payload.menu_item_id,
        name: payload.name,
        min_options_allowed: payload.min_options_allowed,
        max_options_allowed: payload.max_options_allowed,
    });
    let group = restaurant_client
        .create_customization_group(request)
        .await?
        .into_inner();

    Ok((StatusCode::CREATED, Json(group.try_into()?)))
}

#[utoipa::path(
    post,
    path = "/restaurants/{id}/customization-options",
    params(
        ("id" = String, Path, description = "Restaurant ID")
    ),
    request_body = CreateCustomizationOptionRequest,
    responses(
        (status = 201, description = "Customization option created", body = CustomizationOption),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Not an admin or manager of the restaurant", body = ApiErrorResponse),
        (status = 404, description = "Customization group not found in this restaurant", body = ApiErrorResponse),
        (status = 422, description = "Invalid option fields", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state, headers))]
pub async fn create_customization_option(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<CreateCustomizationOptionRequest>,
) -> Result<(StatusCode, Json<CustomizationOption>), ApiError> {
    let mut auth_client = state.auth_client.clone();
    verify_restaurant_access(&headers, &mut auth_client, &id, MENU_EDITORS).await?;

    let mut restaurant_client = state.restaurant_client.clone();
    let menu = fetch_menu(&mut restaurant_client, &id).await?;
    ensure_in_menu(
        has_customization_group(&menu, &payload.group_id),
        "Customization group",
    )?;

    let request = tonic::Request::new(CreateCustomizationOptionPayload {
        group_id: payload.group_id,
        name: payload.name,
        price: Some(Money {
            amount: payload.price,
        }),
        food_type: proto::FoodType::from(payload.food_type) as i32,
    });
    let option = restaurant_client
        .create_customization_option(request)
        .await?
        .into_inner();

    Ok((StatusCode::CREATED, Json(option.try_into()?)))
}

#[utoipa::path(
    post,
    path = "/restaurants/{id}/staff",
    params(
        ("id" = String, Path, description = "Restaurant ID")
    ),
    request_body = AddStaffMemberRequest,
    responses(
        (status = 200, description = "Staff member added or role changed", body = UserProfile),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Not an admin of the restaurant", body = ApiErrorResponse),
        (status = 404, description = "No user with this mobile number", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state, headers))]
pub async fn add_staff_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<AddStaffMemberRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    verify_restaurant_access(&headers, &mut auth_client, &id, ADMINS).await?;

    let request = tonic::Request::new(AddStaffMemberPayload {
        mobile_number: payload.mobile_number,
        restaurant_id: id,
        role: auth_service::StaffRole::from(payload.role) as i32,
    });
    let user = auth_client.add_staff_member(request).await?.into_inner();

    Ok(Json(user.try_into()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> proto::Menu {
        proto::Menu {
            restaurant_id: "r1".to_string(),
            categories: vec![proto::MenuCategory {
                id: "c1".to_string(),
                restaurant_id: "r1".to_string(),
                name: "Burgers".to_string(),
                items: vec![proto::MenuItem {
                    id: "m1".to_string(),
                    category_id: "c1".to_string(),
                    name: "Burger".to_string(),
                    customizable: true,
                    customization_groups: vec![proto::CustomizationGroup {
                        id: "g1".to_string(),
                        menu_item_id: "m1".to_string(),
                        name: "Add-ons".to_string(),
                        max_options_allowed: 1,
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn menu_lookups_find_nested_entries() {
        let menu = menu();
        assert!(has_category(&menu, "c1"));
        assert!(has_menu_item(&menu, "m1"));
        assert!(has_customization_group(&menu, "g1"));
    }

    #[test]
    fn ids_from_other_menus_are_not_found() {
        let menu = menu();
        assert!(!has_category(&menu, "m1"));
        assert!(!has_menu_item(&menu, "c1"));
        assert!(!has_customization_group(&menu, "g2"));

        let err = ensure_in_menu(has_menu_item(&menu, "m9"), "Menu item").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(msg) if msg == "Menu item not found"));
    }
}
