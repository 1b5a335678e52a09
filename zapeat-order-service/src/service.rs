use std::collections::HashMap;

use chrono::{SubsecRound, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{FieldViolation, OrderError};
use crate::models::{
    Order, OrderItem, OrderStatus, PaymentStatus, RestaurantCustomizationOption,
    RestaurantMenuItem, RestaurantStatus,
};
use crate::pricing;
use crate::repository::{OrderQuery, OrderRepository};

/// The authenticated customer placing an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CustomerPrincipal {
    pub customer_id: Uuid,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineItemRequest {
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub customization_option_id: Option<Uuid>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderDetails {
    pub special_instructions: Option<String>,
    pub delivery_address: Option<String>,
}

/// An order together with its items, as stored.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl From<(Order, Vec<OrderItem>)> for PlacedOrder {
    fn from((order, items): (Order, Vec<OrderItem>)) -> Self {
        Self { order, items }
    }
}

pub struct OrderManager<R> {
    repository: R,
}

impl<R: OrderRepository> OrderManager<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Validates and prices the requested lines against the restaurant's menu
    /// and stores the order with its items.
    #[instrument(skip_all, fields(%restaurant_id, customer_id = %principal.customer_id))]
    pub fn create_order(
        &self,
        principal: &CustomerPrincipal,
        restaurant_id: &Uuid,
        line_items: &[LineItemRequest],
        details: OrderDetails,
    ) -> Result<PlacedOrder, OrderError> {
        let restaurant = self
            .repository
            .find_restaurant(restaurant_id)?
            .ok_or(OrderError::NotFound("Restaurant"))?;

        if line_items.is_empty() {
            return Err(OrderError::violation(
                "items",
                "An order needs at least one item",
            ));
        }

        let menu_item_ids = unique(line_items.iter().map(|l| l.menu_item_id));
        let menu_items: HashMap<Uuid, RestaurantMenuItem> = self
            .repository
            .find_menu_items(&menu_item_ids)?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let option_ids = unique(line_items.iter().filter_map(|l| l.customization_option_id));
        let options: HashMap<Uuid, RestaurantCustomizationOption> = if option_ids.is_empty() {
            HashMap::new()
        } else {
            self.repository
                .find_customization_options(&option_ids)?
                .into_iter()
                .map(|o| (o.id, o))
                .collect()
        };

        let order_id = Uuid::new_v4();
        let mut violations = Vec::new();
        let mut items = Vec::with_capacity(line_items.len());
        for (index, line) in line_items.iter().enumerate() {
            let field = |name: &str| format!("items[{index}].{name}");
            let mut valid = true;

            if line.quantity <= 0 {
                violations.push(FieldViolation::new(
                    field("quantity"),
                    "Quantity must be a positive integer",
                ));
                valid = false;
            } else if line.quantity > pricing::MAX_QUANTITY {
                violations.push(FieldViolation::new(
                    field("quantity"),
                    format!("Quantity must not exceed {}", pricing::MAX_QUANTITY),
                ));
                valid = false;
            }

            let menu_item = match menu_items.get(&line.menu_item_id) {
                Some(item) if item.restaurant_id == restaurant.id => Some(item),
                Some(_) => {
                    violations.push(FieldViolation::new(
                        field("menu_item_id"),
                        format!(
                            "Menu item {} does not belong to this restaurant",
                            line.menu_item_id
                        ),
                    ));
                    None
                }
                None => {
                    violations.push(FieldViolation::new(
                        field("menu_item_id"),
                        format!("Menu item {} does not exist", line.menu_item_id),
                    ));
                    None
                }
            };

            let option = match line.customization_option_id {
                None => None,
                Some(option_id) => match options.get(&option_id) {
                    Some(option) if option.menu_item_id == line.menu_item_id => Some(option),
                    Some(_) => {
                        violations.push(FieldViolation::new(
                            field("customization_option_id"),
                            format!(
                                "Customization option {} is not offered for menu item {}",
                                option_id, line.menu_item_id
                            ),
                        ));
                        valid = false;
                        None
                    }
                    None => {
                        violations.push(FieldViolation::new(
                            field("customization_option_id"),
                            format!("Customization option {} does not exist", option_id),
                        ));
                        valid = false;
                        None
                    }
                },
            };

            let Some(menu_item) = menu_item else {
                continue;
            };
            if !valid {
                continue;
            }
            let price = pricing::line_price(
                &menu_item.price,
                option.map(|o| &o.price),
                line.quantity,
            );
            if !pricing::fits_amount(&price) {
                violations.push(FieldViolation::new(
                    field("quantity"),
                    format!("Line total must not exceed {}", pricing::max_amount()),
                ));
                continue;
            }
            items.push(OrderItem {
                id: Uuid::new_v4(),
                order_id,
                menu_item_id: menu_item.id,
                name: menu_item.name.clone(),
                customization_option_id: option.map(|o| o.id),
                customization_name: option.map(|o| o.name.clone()),
                quantity: line.quantity,
                price,
            });
        }

        let total_amount = pricing::order_total(items.iter().map(|i| &i.price));
        if violations.is_empty() && !pricing::fits_amount(&total_amount) {
            violations.push(FieldViolation::new(
                "items",
                format!("Order total must not exceed {}", pricing::max_amount()),
            ));
        }
        if !violations.is_empty() {
            info!(violations = violations.len(), "order rejected");
            return Err(OrderError::Validation(violations));
        }

        // Postgres keeps microseconds; match what a re-fetch returns.
        let now = Utc::now().trunc_subsecs(6);
        let order = Order {
            id: order_id,
            customer_id: principal.customer_id,
            restaurant_id: restaurant.id,
            total_amount,
            payment_status: PaymentStatus::Pending,
            order_status: OrderStatus::Received,
            restaurant_status: RestaurantStatus::Received,
            special_instructions: details.special_instructions,
            delivery_address: details.delivery_address,
            created_at: now,
            updated_at: now,
        };
        self.repository.insert_order(&order, &items)?;
        info!(order_id = %order.id, total_amount = %order.total_amount, "order created");

        Ok(PlacedOrder { order, items })
    }

    pub fn get_order(&self, id: &Uuid) -> Result<PlacedOrder, OrderError> {
        self.repository
            .get_order(id)?
            .map(PlacedOrder::from)
            .ok_or(OrderError::NotFound("Order"))
    }

    pub fn list_orders(&self, query: &OrderQuery) -> Result<Vec<PlacedOrder>, OrderError> {
        Ok(self
            .repository
            .list_orders(query)?
            .into_iter()
            .map(PlacedOrder::from)
            .collect())
    }

    #[instrument(skip(self))]
    pub fn update_order_status(
        &self,
        id: &Uuid,
        status: OrderStatus,
    ) -> Result<PlacedOrder, OrderError> {
        self.modify(id, |mut order| {
            if order.order_status != status && order.order_status.is_terminal() {
                return Err(OrderError::InvalidState {
                    current: order.order_status,
                });
            }
            order.order_status = status;
            Ok(order)
        })
    }

    #[instrument(skip(self))]
    pub fn update_restaurant_status(
        &self,
        id: &Uuid,
        status: RestaurantStatus,
    ) -> Result<PlacedOrder, OrderError> {
        self.modify(id, |mut order| {
            order.restaurant_status = status;
            Ok(order)
        })
    }

    #[instrument(skip(self))]
    pub fn update_payment_status(
        &self,
        id: &Uuid,
        status: PaymentStatus,
    ) -> Result<PlacedOrder, OrderError> {
        self.modify(id, |mut order| {
            order.payment_status = status;
            Ok(order)
        })
    }

    fn modify(
        &self,
        id: &Uuid,
        change: impl FnOnce(Order) -> Result<Order, OrderError>,
    ) -> Result<PlacedOrder, OrderError> {
        self.repository
            .modify_order::<OrderError, _>(id, |order| {
                let mut changed = change(order)?;
                changed.updated_at = Utc::now().trunc_subsecs(6);
                Ok(changed)
            })?
            .ok_or(OrderError::NotFound("Order"))?;
        self.get_order(id)
    }
}

fn unique(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::models::Restaurant;
    use crate::repository::memory::InMemoryOrderRepository;

    fn money(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    struct Fixture {
        manager: OrderManager<InMemoryOrderRepository>,
        restaurant_id: Uuid,
        other_restaurant_id: Uuid,
        burger: Uuid,
        fries: Uuid,
        extra_cheese: Uuid,
        salted: Uuid,
        pizza: Uuid,
        customer: CustomerPrincipal,
    }

    fn fixture() -> Fixture {
        let repository = InMemoryOrderRepository::default();
        let restaurant_id = Uuid::new_v4();
        let other_restaurant_id = Uuid::new_v4();
        let (burger, fries, pizza) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (extra_cheese, salted) = (Uuid::new_v4(), Uuid::new_v4());

        for (id, name) in [(restaurant_id, "Burger Barn"), (other_restaurant_id, "Pizza Place")] {
            repository
                .upsert_restaurant(&Restaurant {
                    id,
                    name: name.to_string(),
                })
                .unwrap();
        }
        let item = |id, restaurant_id, name: &str, price: &str| RestaurantMenuItem {
            id,
            restaurant_id,
            name: name.to_string(),
            price: money(price),
        };
        let option = |id, menu_item_id, name: &str, price: &str| RestaurantCustomizationOption {
            id,
            menu_item_id,
            name: name.to_string(),
            price: money(price),
        };
        repository
            .replace_menu(
                &restaurant_id,
                &[
                    item(burger, restaurant_id, "Burger", "100.00"),
                    item(fries, restaurant_id, "Fries", "30.00"),
                ],
                &[
                    option(extra_cheese, burger, "Extra Cheese", "20.00"),
                    option(salted, fries, "Salted", "5.00"),
                ],
            )
            .unwrap();
        repository
            .replace_menu(
                &other_restaurant_id,
                &[item(pizza, other_restaurant_id, "Pizza", "250.00")],
                &[],
            )
            .unwrap();

        Fixture {
            manager: OrderManager::new(repository),
            restaurant_id,
            other_restaurant_id,
            burger,
            fries,
            extra_cheese,
            salted,
            pizza,
            customer: CustomerPrincipal {
                customer_id: Uuid::new_v4(),
            },
        }
    }

    fn line(menu_item_id: Uuid, quantity: i32, option: Option<Uuid>) -> LineItemRequest {
        LineItemRequest {
            menu_item_id,
            quantity,
            customization_option_id: option,
        }
    }

    fn violations(err: OrderError) -> Vec<FieldViolation> {
        match err {
            OrderError::Validation(violations) => violations,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn customization_price_is_multiplied_by_quantity() {
        let f = fixture();
        let placed = f
            .manager
            .create_order(
                &f.customer,
                &f.restaurant_id,
                &[line(f.burger, 2, Some(f.extra_cheese))],
                OrderDetails::default(),
            )
            .unwrap();

        assert_eq!(placed.items.len(), 1);
        assert_eq!(placed.items[0].price, money("240.00"));
        assert_eq!(placed.items[0].customization_name.as_deref(), Some("Extra Cheese"));
        assert_eq!(placed.order.total_amount, money("240.00"));
    }

    #[test]
    fn total_is_sum_of_lines() {
        let f = fixture();
        let placed = f
            .manager
            .create_order(
                &f.customer,
                &f.restaurant_id,
                &[line(f.burger, 1, None), line(f.fries, 3, None)],
                OrderDetails::default(),
            )
            .unwrap();

        assert_eq!(placed.order.total_amount, money("190.00"));
        let sum: BigDecimal = placed.items.iter().map(|i| i.price.clone()).sum();
        assert_eq!(placed.order.total_amount, sum);
    }

    #[test]
    fn new_order_starts_received_and_pending() {
        let f = fixture();
        let placed = f
            .manager
            .create_order(
                &f.customer,
                &f.restaurant_id,
                &[line(f.fries, 1, Some(f.salted))],
                OrderDetails {
                    special_instructions: Some("no ketchup".to_string()),
                    delivery_address: None,
                },
            )
            .unwrap();

        let order = &placed.order;
        assert_eq!(order.order_status, OrderStatus::Received);
        assert_eq!(order.restaurant_status, RestaurantStatus::Received);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.customer_id, f.customer.customer_id);
        assert_eq!(order.special_instructions.as_deref(), Some("no ketchup"));
        assert!(placed.items.iter().all(|i| i.order_id == order.id));
    }

    #[test]
    fn timestamps_have_microsecond_precision() {
        let f = fixture();
        let placed = f
            .manager
            .create_order(
                &f.customer,
                &f.restaurant_id,
                &[line(f.fries, 1, None)],
                OrderDetails::default(),
            )
            .unwrap();
        assert_eq!(placed.order.created_at.timestamp_subsec_nanos() % 1_000, 0);
        assert_eq!(placed.order.created_at, placed.order.updated_at);

        let updated = f
            .manager
            .update_payment_status(&placed.order.id, PaymentStatus::Paid)
            .unwrap();
        assert_eq!(updated.order.updated_at.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn oversized_quantity_is_a_field_violation() {
        let f = fixture();
        let err = f
            .manager
            .create_order(
                &f.customer,
                &f.restaurant_id,
                &[line(f.fries, 1, None), line(f.burger, i32::MAX, None)],
                OrderDetails::default(),
            )
            .unwrap_err();
        let violations = violations(err);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "items[1].quantity");
        assert_eq!(f.manager.repository().order_count(), 0);
    }

    #[test]
    fn amounts_beyond_column_range_are_rejected() {
        let f = fixture();
        let (caviar, truffle) = (Uuid::new_v4(), Uuid::new_v4());
        let item = |id, name: &str| RestaurantMenuItem {
            id,
            restaurant_id: f.other_restaurant_id,
            name: name.to_string(),
            price: money("60000000.00"),
        };
        f.manager
            .repository()
            .replace_menu(
                &f.other_restaurant_id,
                &[item(caviar, "Caviar"), item(truffle, "Truffle")],
                &[],
            )
            .unwrap();

        let err = f
            .manager
            .create_order(
                &f.customer,
                &f.other_restaurant_id,
                &[line(caviar, 2, None)],
                OrderDetails::default(),
            )
            .unwrap_err();
        assert_eq!(violations(err)[0].field, "items[0].quantity");

        let err = f
            .manager
            .create_order(
                &f.customer,
                &f.other_restaurant_id,
                &[line(caviar, 1, None), line(truffle, 1, None)],
                OrderDetails::default(),
            )
            .unwrap_err();
        let violations = violations(err);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "items");
    }

    #[test]
    fn same_menu_item_on_two_lines_is_priced_per_line() {
        let f = fixture();
        let placed = f
            .manager
            .create_order(
                &f.customer,
                &f.restaurant_id,
                &[line(f.burger, 1, None), line(f.burger, 1, Some(f.extra_cheese))],
                OrderDetails::default(),
            )
            .unwrap();

        assert_eq!(placed.items.len(), 2);
        assert_eq!(placed.order.total_amount, money("220.00"));
    }

    #[test]
    fn menu_item_from_another_restaurant_is_rejected() {
        let f = fixture();
        let err = f
            .manager
            .create_order(
                &f.customer,
                &f.restaurant_id,
                &[line(f.pizza, 1, None)],
                OrderDetails::default(),
            )
            .unwrap_err();

        let violations = violations(err);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "items[0].menu_item_id");
        assert_eq!(f.manager.repository().order_count(), 0);
        assert_eq!(f.manager.repository().order_item_count(), 0);
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let f = fixture();
        for quantity in [0, -3] {
            let err = f
                .manager
                .create_order(
                    &f.customer,
                    &f.restaurant_id,
                    &[line(f.burger, quantity, None)],
                    OrderDetails::default(),
                )
                .unwrap_err();
            assert_eq!(violations(err)[0].field, "items[0].quantity");
        }
        assert_eq!(f.manager.repository().order_count(), 0);
    }

    #[test]
    fn option_of_another_menu_item_is_rejected() {
        let f = fixture();
        let err = f
            .manager
            .create_order(
                &f.customer,
                &f.restaurant_id,
                &[line(f.fries, 1, Some(f.extra_cheese))],
                OrderDetails::default(),
            )
            .unwrap_err();

        assert_eq!(violations(err)[0].field, "items[0].customization_option_id");
    }

    #[test]
    fn unknown_references_are_rejected() {
        let f = fixture();
        let err = f
            .manager
            .create_order(
                &f.customer,
                &f.restaurant_id,
                &[line(Uuid::new_v4(), 1, None), line(f.burger, 1, Some(Uuid::new_v4()))],
                OrderDetails::default(),
            )
            .unwrap_err();

        let fields: Vec<_> = violations(err).into_iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            vec!["items[0].menu_item_id", "items[1].customization_option_id"]
        );
    }

    #[test]
    fn every_violation_is_reported() {
        let f = fixture();
        let err = f
            .manager
            .create_order(
                &f.customer,
                &f.restaurant_id,
                &[
                    line(f.burger, 0, None),
                    line(f.fries, 2, None),
                    line(f.pizza, -1, Some(f.salted)),
                ],
                OrderDetails::default(),
            )
            .unwrap_err();

        let fields: Vec<_> = violations(err).into_iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            vec![
                "items[0].quantity",
                "items[2].quantity",
                "items[2].menu_item_id",
                "items[2].customization_option_id",
            ]
        );
    }

    #[test]
    fn empty_order_is_rejected() {
        let f = fixture();
        let err = f
            .manager
            .create_order(&f.customer, &f.restaurant_id, &[], OrderDetails::default())
            .unwrap_err();

        assert_eq!(violations(err)[0].field, "items");
    }

    #[test]
    fn unknown_restaurant_is_not_found() {
        let f = fixture();
        let err = f
            .manager
            .create_order(
                &f.customer,
                &Uuid::new_v4(),
                &[line(f.burger, 1, None)],
                OrderDetails::default(),
            )
            .unwrap_err();

        assert!(matches!(err, OrderError::NotFound("Restaurant")));
    }

    #[test]
    fn failed_insert_persists_nothing() {
        let f = fixture();
        f.manager.repository().fail_next_insert();
        let err = f
            .manager
            .create_order(
                &f.customer,
                &f.restaurant_id,
                &[line(f.burger, 1, None)],
                OrderDetails::default(),
            )
            .unwrap_err();

        assert!(matches!(err, OrderError::Internal(_)));
        assert_eq!(f.manager.repository().order_count(), 0);
        assert_eq!(f.manager.repository().order_item_count(), 0);
    }

    #[test]
    fn stored_prices_survive_menu_price_changes() {
        let f = fixture();
        let placed = f
            .manager
            .create_order(
                &f.customer,
                &f.restaurant_id,
                &[line(f.burger, 2, Some(f.extra_cheese))],
                OrderDetails::default(),
            )
            .unwrap();

        f.manager
            .repository()
            .set_menu_item_price(&f.burger, money("150.00"));
        let fetched = f.manager.get_order(&placed.order.id).unwrap();

        assert_eq!(fetched.order.total_amount, money("240.00"));
        assert_eq!(fetched.items[0].price, money("240.00"));
    }

    #[test]
    fn terminal_order_status_is_final() {
        let f = fixture();
        let placed = f
            .manager
            .create_order(
                &f.customer,
                &f.restaurant_id,
                &[line(f.burger, 1, None)],
                OrderDetails::default(),
            )
            .unwrap();
        let id = placed.order.id;

        let preparing = f
            .manager
            .update_order_status(&id, OrderStatus::Preparing)
            .unwrap();
        assert_eq!(preparing.order.order_status, OrderStatus::Preparing);
        assert!(preparing.order.updated_at >= placed.order.updated_at);

        f.manager
            .update_order_status(&id, OrderStatus::Cancelled)
            .unwrap();
        let err = f
            .manager
            .update_order_status(&id, OrderStatus::Preparing)
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidState {
                current: OrderStatus::Cancelled
            }
        ));
        // Re-stating the current status is harmless.
        f.manager
            .update_order_status(&id, OrderStatus::Cancelled)
            .unwrap();
    }

    #[test]
    fn restaurant_and_payment_status_updates() {
        let f = fixture();
        let placed = f
            .manager
            .create_order(
                &f.customer,
                &f.restaurant_id,
                &[line(f.fries, 2, None)],
                OrderDetails::default(),
            )
            .unwrap();
        let id = placed.order.id;

        let accepted = f
            .manager
            .update_restaurant_status(&id, RestaurantStatus::Accepted)
            .unwrap();
        assert_eq!(accepted.order.restaurant_status, RestaurantStatus::Accepted);
        let paid = f
            .manager
            .update_payment_status(&id, PaymentStatus::Paid)
            .unwrap();
        assert_eq!(paid.order.payment_status, PaymentStatus::Paid);
        assert_eq!(paid.order.total_amount, money("60.00"));
        assert_eq!(paid.items.len(), 1);

        let missing = f
            .manager
            .update_payment_status(&Uuid::new_v4(), PaymentStatus::Paid)
            .unwrap_err();
        assert!(matches!(missing, OrderError::NotFound("Order")));
    }

    #[test]
    fn listing_filters_by_customer_and_restaurant() {
        let f = fixture();
        let other_customer = CustomerPrincipal {
            customer_id: Uuid::new_v4(),
        };
        for customer in [&f.customer, &f.customer, &other_customer] {
            f.manager
                .create_order(
                    customer,
                    &f.restaurant_id,
                    &[line(f.burger, 1, None)],
                    OrderDetails::default(),
                )
                .unwrap();
        }
        f.manager
            .create_order(
                &f.customer,
                &f.other_restaurant_id,
                &[line(f.pizza, 1, None)],
                OrderDetails::default(),
            )
            .unwrap();

        let mine = f
            .manager
            .list_orders(&OrderQuery {
                customer_id: Some(f.customer.customer_id),
                limit: 10,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(mine.len(), 3);

        let restaurant = f
            .manager
            .list_orders(&OrderQuery {
                restaurant_id: Some(f.restaurant_id),
                limit: 10,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(restaurant.len(), 3);
        assert!(restaurant.iter().all(|p| p.items.len() == 1));
    }
}
