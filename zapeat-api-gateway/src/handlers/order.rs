use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post, put},
};
use serde::Deserialize;
use tonic::transport::Channel;
use tracing::instrument;
use utoipa::IntoParams;
use zapeat_proto::order_service::{
    self as proto, CreateOrderPayload, GetOrderPayload, LineItem, ListOrdersPayload,
    UpdateOrderStatusPayload, UpdatePaymentStatusPayload, UpdateRestaurantStatusPayload,
    order_service_client::OrderServiceClient,
};

use crate::error::ApiError;
use crate::models::*;

use super::{
    ANY_STAFF, AppState, current_user, extract_user_id_from_token, has_role,
    verify_restaurant_access,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersQuery {
    /// Page size, 10 by default and at most 100
    pub first: Option<u32>,
    /// Cursor of the last order of the previous page
    pub after: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/restaurants/{id}/orders",
            post(create_order).get(list_restaurant_orders),
        )
        .route("/orders", get(list_my_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", put(update_order_status))
        .route("/orders/{id}/restaurant-status", put(update_restaurant_status))
        .route("/orders/{id}/payment-status", put(update_payment_status))
}

async fn fetch_order(
    client: &mut OrderServiceClient<Channel>,
    id: String,
) -> Result<proto::Order, ApiError> {
    let request = tonic::Request::new(GetOrderPayload { id });
    Ok(client.get_order(request).await?.into_inner())
}

/// Loads the order after checking that the caller works at its restaurant.
async fn fetch_order_as_staff(
    state: &AppState,
    headers: &HeaderMap,
    id: String,
) -> Result<proto::Order, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let user = current_user(headers, &mut auth_client).await?;

    let mut order_client = state.order_client.clone();
    let order = fetch_order(&mut order_client, id).await?;

    if has_role(&user, &order.restaurant_id, ANY_STAFF) {
        Ok(order)
    } else {
        Err(ApiError::Forbidden)
    }
}

fn list_response(response: proto::ListOrdersResponse) -> Result<ListOrdersResponse, ApiError> {
    let edges = response
        .edges
        .into_iter()
        .map(|edge| {
            let node = edge
                .node
                .ok_or_else(|| ApiError::InternalError("order edge without node".to_string()))?;
            Ok(OrderEdge {
                node: node.try_into()?,
                cursor: edge.cursor,
            })
        })
        .collect::<Result<_, ApiError>>()?;
    Ok(ListOrdersResponse { edges })
}

#[utoipa::path(
    post,
    path = "/restaurants/{id}/orders",
    params(
        ("id" = String, Path, description = "Restaurant ID")
    ),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed and priced", body = Order),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
        (status = 422, description = "Invalid line items", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state, headers))]
pub async fn create_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let mut auth_client = state.auth_client.clone();
    let customer_id = extract_user_id_from_token(&headers, &mut auth_client).await?;

    let mut order_client = state.order_client.clone();

    let items = payload
        .items
        .into_iter()
        .map(|item| LineItem {
            menu_item_id: item.menu_item_id,
            quantity: item.quantity,
            customization_option_id: item.customization_option_id,
        })
        .collect();

    let request = tonic::Request::new(CreateOrderPayload {
        restaurant_id: id,
        customer_id,
        items,
        special_instructions: payload.special_instructions,
        delivery_address: payload.delivery_address,
    });

    let order = order_client.create_order(request).await?.into_inner();

    Ok((StatusCode::CREATED, Json(order.try_into()?)))
}

#[utoipa::path(
    get,
    path = "/restaurants/{id}/orders",
    params(
        ("id" = String, Path, description = "Restaurant ID"),
        ListOrdersQuery
    ),
    responses(
        (status = 200, description = "Orders of the restaurant, newest first", body = ListOrdersResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Not staff of the restaurant", body = ApiErrorResponse),
        (status = 422, description = "Invalid cursor", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state, headers))]
pub async fn list_restaurant_orders(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ListOrdersQuery>,
    headers: HeaderMap,
) -> Result<Json<ListOrdersResponse>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    verify_restaurant_access(&headers, &mut auth_client, &id, ANY_STAFF).await?;

    let mut order_client = state.order_client.clone();
    let request = tonic::Request::new(ListOrdersPayload {
        customer_id: None,
        restaurant_id: Some(id),
        first: query.first,
        after: query.after,
    });
    let response = order_client.list_orders(request).await?.into_inner();

    Ok(Json(list_response(response)?))
}

#[utoipa::path(
    get,
    path = "/orders",
    params(ListOrdersQuery),
    responses(
        (status = 200, description = "Orders placed by the caller, newest first", body = ListOrdersResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 422, description = "Invalid cursor", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state, headers))]
pub async fn list_my_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
    headers: HeaderMap,
) -> Result<Json<ListOrdersResponse>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let user_id = extract_user_id_from_token(&headers, &mut auth_client).await?;

    let mut order_client = state.order_client.clone();
    let request = tonic::Request::new(ListOrdersPayload {
        customer_id: Some(user_id),
        restaurant_id: None,
        first: query.first,
        after: query.after,
    });
    let response = order_client.list_orders(request).await?.into_inner();

    Ok(Json(list_response(response)?))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order details", body = Order),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Neither the customer nor staff of the restaurant", body = ApiErrorResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state, headers))]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Order>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let user = current_user(&headers, &mut auth_client).await?;

    let mut order_client = state.order_client.clone();
    let order = fetch_order(&mut order_client, id).await?;

    if order.customer_id != user.id && !has_role(&user, &order.restaurant_id, ANY_STAFF) {
        return Err(ApiError::Forbidden);
    }

    Ok(Json(order.try_into()?))
}

#[utoipa::path(
    put,
    path = "/orders/{id}/status",
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = Order),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Not staff of the restaurant", body = ApiErrorResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
        (status = 409, description = "Order is already completed or cancelled", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state, headers))]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    let order = fetch_order_as_staff(&state, &headers, id).await?;

    let mut order_client = state.order_client.clone();
    let request = tonic::Request::new(UpdateOrderStatusPayload {
        id: order.id,
        status: proto::OrderStatus::from(payload.status) as i32,
    });
    let order = order_client.update_order_status(request).await?.into_inner();

    Ok(Json(order.try_into()?))
}

#[utoipa::path(
    put,
    path = "/orders/{id}/restaurant-status",
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    request_body = UpdateRestaurantStatusRequest,
    responses(
        (status = 200, description = "Restaurant decision recorded", body = Order),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Not staff of the restaurant", body = ApiErrorResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state, headers))]
pub async fn update_restaurant_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<UpdateRestaurantStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    let order = fetch_order_as_staff(&state, &headers, id).await?;

    let mut order_client = state.order_client.clone();
    let request = tonic::Request::new(UpdateRestaurantStatusPayload {
        id: order.id,
        status: proto::RestaurantStatus::from(payload.status) as i32,
    });
    let order = order_client
        .update_restaurant_status(request)
        .await?
        .into_inner();

    Ok(Json(order.try_into()?))
}

#[utoipa::path(
    put,
    path = "/orders/{id}/payment-status",
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Payment status updated", body = Order),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Not staff of the restaurant", body = ApiErrorResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state, headers))]
pub async fn update_payment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    let order = fetch_order_as_staff(&state, &headers, id).await?;

    let mut order_client = state.order_client.clone();
    let request = tonic::Request::new(UpdatePaymentStatusPayload {
        id: order.id,
        status: proto::PaymentStatus::from(payload.status) as i32,
    });
    let order = order_client
        .update_payment_status(request)
        .await?
        .into_inner();

    Ok(Json(order.try_into()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_keep_their_cursors() {
        let response = proto::ListOrdersResponse {
            edges: vec![proto::OrderEdge {
                node: Some(proto::Order {
                    id: "o1".to_string(),
                    ..Default::default()
                }),
                cursor: "1735689600000000:o1".to_string(),
            }],
        };

        let list = list_response(response).unwrap();
        assert_eq!(list.edges[0].node.id, "o1");
        assert_eq!(list.edges[0].cursor, "1735689600000000:o1");
    }

    #[test]
    fn edge_without_node_is_an_internal_error() {
        let response = proto::ListOrdersResponse {
            edges: vec![proto::OrderEdge {
                node: None,
                cursor: String::new(),
            }],
        };
        assert!(matches!(
            list_response(response),
            Err(ApiError::InternalError(_))
        ));
    }
}
