use tonic::{Request, Response, Status};
use uuid::Uuid;
use zapeat_proto::order_service::{
    self as proto, order_service_server::OrderService, CreateOrderPayload, GetOrderPayload,
    ListOrdersPayload, ListOrdersResponse, OrderEdge, UpdateOrderStatusPayload,
    UpdatePaymentStatusPayload, UpdateRestaurantStatusPayload,
};

use crate::error::{FieldViolation, OrderError};
use crate::repository::{OrderQuery, OrderRepository};
use crate::serializer::{order_cursor, parse_order_cursor, serialize_order};
use crate::service::{CustomerPrincipal, LineItemRequest, OrderDetails, OrderManager};

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

pub struct OrderServiceImpl<R> {
    manager: OrderManager<R>,
}

impl<R: OrderRepository> OrderServiceImpl<R> {
    pub fn new(repository: R) -> Self {
        Self {
            manager: OrderManager::new(repository),
        }
    }
}

#[tonic::async_trait]
impl<R: OrderRepository> OrderService for OrderServiceImpl<R> {
    async fn create_order(
        &self,
        request: Request<CreateOrderPayload>,
    ) -> Result<Response<proto::Order>, Status> {
        let payload = request.into_inner();
        let restaurant_id: Uuid = payload
            .restaurant_id
            .parse()
            .map_err(|_| OrderError::NotFound("Restaurant"))?;
        let customer_id: Uuid = payload
            .customer_id
            .parse()
            .map_err(|_| OrderError::violation("customer_id", "Invalid customer id"))?;
        let line_items = parse_line_items(&payload.items)?;
        let details = OrderDetails {
            special_instructions: non_blank(payload.special_instructions),
            delivery_address: non_blank(payload.delivery_address),
        };

        let placed = self.manager.create_order(
            &CustomerPrincipal { customer_id },
            &restaurant_id,
            &line_items,
            details,
        )?;
        Ok(Response::new(serialize_order(&placed)))
    }

    async fn get_order(
        &self,
        request: Request<GetOrderPayload>,
    ) -> Result<Response<proto::Order>, Status> {
        let id = parse_order_id(&request.into_inner().id)?;
        let placed = self.manager.get_order(&id)?;
        Ok(Response::new(serialize_order(&placed)))
    }

    async fn list_orders(
        &self,
        request: Request<ListOrdersPayload>,
    ) -> Result<Response<ListOrdersResponse>, Status> {
        let payload = request.into_inner();
        let mut query = OrderQuery {
            limit: payload.first.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE) as i64,
            ..Default::default()
        };
        if let Some(customer_id) = payload.customer_id {
            query.customer_id = Some(
                customer_id
                    .parse()
                    .map_err(|_| Status::invalid_argument("Invalid customer id"))?,
            );
        }
        if let Some(restaurant_id) = payload.restaurant_id {
            query.restaurant_id = Some(
                restaurant_id
                    .parse()
                    .map_err(|_| Status::invalid_argument("Invalid restaurant id"))?,
            );
        }
        if let Some(after) = payload.after {
            query.after = Some(
                parse_order_cursor(&after)
                    .ok_or_else(|| Status::invalid_argument("Invalid cursor"))?,
            );
        }

        let edges = self
            .manager
            .list_orders(&query)?
            .into_iter()
            .map(|placed| OrderEdge {
                cursor: order_cursor(&placed.order),
                node: Some(serialize_order(&placed)),
            })
            .collect();
        Ok(Response::new(ListOrdersResponse { edges }))
    }

    async fn update_order_status(
        &self,
        request: Request<UpdateOrderStatusPayload>,
    ) -> Result<Response<proto::Order>, Status> {
        let payload = request.into_inner();
        let id = parse_order_id(&payload.id)?;
        let status = proto::OrderStatus::try_from(payload.status)
            .map_err(|_| Status::invalid_argument("Invalid order status"))?;
        let placed = self.manager.update_order_status(&id, status.into())?;
        Ok(Response::new(serialize_order(&placed)))
    }

    async fn update_restaurant_status(
        &self,
        request: Request<UpdateRestaurantStatusPayload>,
    ) -> Result<Response<proto::Order>, Status> {
        let payload = request.into_inner();
        let id = parse_order_id(&payload.id)?;
        let status = proto::RestaurantStatus::try_from(payload.status)
            .map_err(|_| Status::invalid_argument("Invalid restaurant status"))?;
        let placed = self.manager.update_restaurant_status(&id, status.into())?;
        Ok(Response::new(serialize_order(&placed)))
    }

    async fn update_payment_status(
        &self,
        request: Request<UpdatePaymentStatusPayload>,
    ) -> Result<Response<proto::Order>, Status> {
        let payload = request.into_inner();
        let id = parse_order_id(&payload.id)?;
        let status = proto::PaymentStatus::try_from(payload.status)
            .map_err(|_| Status::invalid_argument("Invalid payment status"))?;
        let placed = self.manager.update_payment_status(&id, status.into())?;
        Ok(Response::new(serialize_order(&placed)))
    }
}

fn parse_order_id(id: &str) -> Result<Uuid, Status> {
    id.parse()
        .map_err(|_| Status::invalid_argument("Invalid order id"))
}

/// Malformed identifiers are reported together, with the same field paths
/// the catalog checks use.
fn parse_line_items(items: &[proto::LineItem]) -> Result<Vec<LineItemRequest>, OrderError> {
    let mut violations = Vec::new();
    let mut line_items = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let menu_item_id = item.menu_item_id.parse::<Uuid>().map_err(|_| {
            FieldViolation::new(
                format!("items[{index}].menu_item_id"),
                "Invalid menu item id",
            )
        });
        let customization_option_id = item
            .customization_option_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| id.parse::<Uuid>())
            .transpose()
            .map_err(|_| {
                FieldViolation::new(
                    format!("items[{index}].customization_option_id"),
                    "Invalid customization option id",
                )
            });
        match (menu_item_id, customization_option_id) {
            (Ok(menu_item_id), Ok(customization_option_id)) => line_items.push(LineItemRequest {
                menu_item_id,
                quantity: item.quantity,
                customization_option_id,
            }),
            (menu_item_id, customization_option_id) => {
                violations.extend(menu_item_id.err());
                violations.extend(customization_option_id.err());
            }
        }
    }
    if violations.is_empty() {
        Ok(line_items)
    } else {
        Err(OrderError::Validation(violations))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use prost::Message;
    use tonic::Code;
    use zapeat_proto::common::ValidationErrors;

    use super::*;
    use crate::models::{Restaurant, RestaurantCustomizationOption, RestaurantMenuItem};
    use crate::repository::memory::InMemoryOrderRepository;

    struct Fixture {
        service: OrderServiceImpl<InMemoryOrderRepository>,
        restaurant_id: Uuid,
        burger_id: Uuid,
        cheese_id: Uuid,
    }

    fn fixture() -> Fixture {
        let repository = InMemoryOrderRepository::default();
        let restaurant_id = Uuid::new_v4();
        let burger_id = Uuid::new_v4();
        let cheese_id = Uuid::new_v4();
        repository
            .upsert_restaurant(&Restaurant {
                id: restaurant_id,
                name: "Burger Barn".to_string(),
            })
            .unwrap();
        repository
            .replace_menu(
                &restaurant_id,
                &[RestaurantMenuItem {
                    id: burger_id,
                    restaurant_id,
                    name: "Burger".to_string(),
                    price: BigDecimal::from_str("100.00").unwrap(),
                }],
                &[RestaurantCustomizationOption {
                    id: cheese_id,
                    menu_item_id: burger_id,
                    name: "Extra Cheese".to_string(),
                    price: BigDecimal::from_str("20.00").unwrap(),
                }],
            )
            .unwrap();
        Fixture {
            service: OrderServiceImpl::new(repository),
            restaurant_id,
            burger_id,
            cheese_id,
        }
    }

    fn payload(f: &Fixture, items: Vec<proto::LineItem>) -> CreateOrderPayload {
        CreateOrderPayload {
            restaurant_id: f.restaurant_id.to_string(),
            customer_id: Uuid::new_v4().to_string(),
            items,
            special_instructions: Some("No onions".to_string()),
            delivery_address: Some("  ".to_string()),
        }
    }

    fn line(menu_item_id: &str, quantity: i32, option: Option<&str>) -> proto::LineItem {
        proto::LineItem {
            menu_item_id: menu_item_id.to_string(),
            quantity,
            customization_option_id: option.map(str::to_string),
        }
    }

    fn violations(status: &Status) -> Vec<(String, String)> {
        ValidationErrors::decode(status.details())
            .unwrap()
            .violations
            .into_iter()
            .map(|v| (v.field, v.description))
            .collect()
    }

    #[tokio::test]
    async fn create_order_returns_priced_order() {
        let f = fixture();
        let items = vec![line(
            &f.burger_id.to_string(),
            2,
            Some(&f.cheese_id.to_string()),
        )];

        let order = f
            .service
            .create_order(Request::new(payload(&f, items)))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(order.total_amount.unwrap().amount, "240.00");
        assert_eq!(order.order_status, proto::OrderStatus::Received as i32);
        assert_eq!(order.payment_status, proto::PaymentStatus::Pending as i32);
        assert_eq!(order.special_instructions.as_deref(), Some("No onions"));
        assert_eq!(order.delivery_address, None);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].customization_name.as_deref(), Some("Extra Cheese"));
    }

    #[tokio::test]
    async fn malformed_ids_are_reported_per_line() {
        let f = fixture();
        let items = vec![
            line("not-a-uuid", 1, None),
            line(&f.burger_id.to_string(), 1, Some("also-bad")),
        ];

        let status = f
            .service
            .create_order(Request::new(payload(&f, items)))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
        let fields: Vec<String> = violations(&status).into_iter().map(|(f, _)| f).collect();
        assert_eq!(
            fields,
            vec!["items[0].menu_item_id", "items[1].customization_option_id"]
        );
    }

    #[tokio::test]
    async fn empty_customization_option_means_none() {
        let f = fixture();
        let items = vec![line(&f.burger_id.to_string(), 1, Some(""))];

        let order = f
            .service
            .create_order(Request::new(payload(&f, items)))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(order.total_amount.unwrap().amount, "100.00");
    }

    #[tokio::test]
    async fn unknown_restaurant_is_not_found() {
        let f = fixture();
        let mut request = payload(&f, vec![line(&f.burger_id.to_string(), 1, None)]);
        request.restaurant_id = "nope".to_string();

        let status = f
            .service
            .create_order(Request::new(request))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);
    }

    #[tokio::test]
    async fn list_orders_pages_with_cursor() {
        let f = fixture();
        let customer_id = Uuid::new_v4().to_string();
        for _ in 0..3 {
            let mut request = payload(&f, vec![line(&f.burger_id.to_string(), 1, None)]);
            request.customer_id = customer_id.clone();
            f.service.create_order(Request::new(request)).await.unwrap();
        }

        let first = f
            .service
            .list_orders(Request::new(ListOrdersPayload {
                customer_id: Some(customer_id.clone()),
                first: Some(2),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(first.edges.len(), 2);

        let rest = f
            .service
            .list_orders(Request::new(ListOrdersPayload {
                customer_id: Some(customer_id),
                first: Some(2),
                after: Some(first.edges[1].cursor.clone()),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(rest.edges.len(), 1);

        let mut seen: Vec<String> = first
            .edges
            .iter()
            .chain(rest.edges.iter())
            .map(|e| e.node.as_ref().unwrap().id.clone())
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 3);
    }

    #[tokio::test]
    async fn invalid_cursor_is_rejected() {
        let f = fixture();
        let status = f
            .service
            .list_orders(Request::new(ListOrdersPayload {
                after: Some("garbage".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn status_updates_stop_at_terminal_state() {
        let f = fixture();
        let order = f
            .service
            .create_order(Request::new(payload(
                &f,
                vec![line(&f.burger_id.to_string(), 1, None)],
            )))
            .await
            .unwrap()
            .into_inner();

        let completed = f
            .service
            .update_order_status(Request::new(UpdateOrderStatusPayload {
                id: order.id.clone(),
                status: proto::OrderStatus::Completed as i32,
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(completed.order_status, proto::OrderStatus::Completed as i32);

        let status = f
            .service
            .update_order_status(Request::new(UpdateOrderStatusPayload {
                id: order.id.clone(),
                status: proto::OrderStatus::Preparing as i32,
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::FailedPrecondition);

        let paid = f
            .service
            .update_payment_status(Request::new(UpdatePaymentStatusPayload {
                id: order.id,
                status: proto::PaymentStatus::Paid as i32,
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(paid.payment_status, proto::PaymentStatus::Paid as i32);
    }

    #[tokio::test]
    async fn unknown_status_value_is_invalid() {
        let f = fixture();
        let status = f
            .service
            .update_restaurant_status(Request::new(UpdateRestaurantStatusPayload {
                id: Uuid::new_v4().to_string(),
                status: 42,
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }
}
