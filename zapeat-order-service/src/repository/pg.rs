use diesel::{delete, insert_into, prelude::*, update, PgConnection};
use uuid::Uuid;

use super::{OrderQuery, OrderRepository, RepositoryError};
use crate::models::{
    Order, OrderItem, Restaurant, RestaurantCustomizationOption, RestaurantMenuItem,
};
use crate::schema;

pub struct PgOrderRepository {
    database_url: String,
}

impl PgOrderRepository {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    fn connect(&self) -> Result<PgConnection, RepositoryError> {
        Ok(PgConnection::establish(&self.database_url)?)
    }
}

fn load_items(
    conn: &mut PgConnection,
    orders: &[Order],
) -> Result<Vec<Vec<OrderItem>>, diesel::result::Error> {
    let items = OrderItem::belonging_to(orders)
        .select(OrderItem::as_select())
        .load(conn)?;
    Ok(items.grouped_by(orders))
}

enum TxError<E> {
    Database(diesel::result::Error),
    Rejected(E),
}

impl<E> From<diesel::result::Error> for TxError<E> {
    fn from(err: diesel::result::Error) -> Self {
        TxError::Database(err)
    }
}

impl OrderRepository for PgOrderRepository {
    fn find_restaurant(&self, id: &Uuid) -> Result<Option<Restaurant>, RepositoryError> {
        let conn = &mut self.connect()?;
        Ok(schema::restaurants::table
            .find(id)
            .select(Restaurant::as_select())
            .first(conn)
            .optional()?)
    }

    fn find_menu_items(&self, ids: &[Uuid]) -> Result<Vec<RestaurantMenuItem>, RepositoryError> {
        let conn = &mut self.connect()?;
        Ok(schema::restaurant_menu_items::table
            .select(RestaurantMenuItem::as_select())
            .filter(schema::restaurant_menu_items::id.eq_any(ids))
            .load(conn)?)
    }

    fn find_customization_options(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<RestaurantCustomizationOption>, RepositoryError> {
        let conn = &mut self.connect()?;
        Ok(schema::restaurant_customization_options::table
            .select(RestaurantCustomizationOption::as_select())
            .filter(schema::restaurant_customization_options::id.eq_any(ids))
            .load(conn)?)
    }

    fn insert_order(&self, order: &Order, items: &[OrderItem]) -> Result<(), RepositoryError> {
        let conn = &mut self.connect()?;
        conn.transaction(|conn| {
            insert_into(schema::orders::table)
                .values(order)
                .execute(conn)?;
            insert_into(schema::order_items::table)
                .values(items)
                .execute(conn)?;
            Ok(())
        })
    }

    fn get_order(&self, id: &Uuid) -> Result<Option<(Order, Vec<OrderItem>)>, RepositoryError> {
        let conn = &mut self.connect()?;
        let Some(order) = schema::orders::table
            .find(id)
            .select(Order::as_select())
            .first::<Order>(conn)
            .optional()?
        else {
            return Ok(None);
        };
        let items = OrderItem::belonging_to(&order)
            .select(OrderItem::as_select())
            .load(conn)?;
        Ok(Some((order, items)))
    }

    fn list_orders(
        &self,
        query: &OrderQuery,
    ) -> Result<Vec<(Order, Vec<OrderItem>)>, RepositoryError> {
        use schema::orders::dsl::*;

        let conn = &mut self.connect()?;
        let mut statement = orders.select(Order::as_select()).into_boxed();
        if let Some(cid) = query.customer_id {
            statement = statement.filter(customer_id.eq(cid));
        }
        if let Some(rid) = query.restaurant_id {
            statement = statement.filter(restaurant_id.eq(rid));
        }
        if let Some((after_created_at, after_id)) = query.after {
            // (created_at, id) ordering: newer first, ties broken by id.
            statement = statement.filter(
                created_at
                    .lt(after_created_at)
                    .or(created_at.eq(after_created_at).and(id.gt(after_id))),
            );
        }
        let results = statement
            .order((created_at.desc(), id.asc()))
            .limit(query.limit)
            .load::<Order>(conn)?;
        let items = load_items(conn, &results)?;
        Ok(results.into_iter().zip(items).collect())
    }

    fn modify_order<E, F>(&self, order_id: &Uuid, change: F) -> Result<Option<Order>, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(Order) -> Result<Order, E>,
    {
        use schema::orders::dsl::*;

        let conn = &mut self.connect()?;
        let result = conn.transaction::<_, TxError<E>, _>(|conn| {
            let Some(current) = orders
                .find(order_id)
                .select(Order::as_select())
                .for_update()
                .first::<Order>(conn)
                .optional()?
            else {
                return Ok(None);
            };
            let changed = change(current).map_err(TxError::Rejected)?;
            update(orders.find(order_id))
                .set((
                    order_status.eq(changed.order_status),
                    restaurant_status.eq(changed.restaurant_status),
                    payment_status.eq(changed.payment_status),
                    updated_at.eq(changed.updated_at),
                ))
                .execute(conn)?;
            Ok(Some(changed))
        });
        match result {
            Ok(order) => Ok(order),
            Err(TxError::Database(err)) => Err(RepositoryError::from(err).into()),
            Err(TxError::Rejected(err)) => Err(err),
        }
    }

    fn upsert_restaurant(&self, restaurant: &Restaurant) -> Result<(), RepositoryError> {
        let conn = &mut self.connect()?;
        insert_into(schema::restaurants::table)
            .values(restaurant)
            .on_conflict(schema::restaurants::id)
            .do_update()
            .set(restaurant)
            .execute(conn)?;
        Ok(())
    }

    fn remove_restaurant(&self, id: &Uuid) -> Result<(), RepositoryError> {
        let conn = &mut self.connect()?;
        // The menu goes with it through ON DELETE CASCADE.
        delete(schema::restaurants::table.find(id)).execute(conn)?;
        Ok(())
    }

    fn replace_menu(
        &self,
        rid: &Uuid,
        menu_items: &[RestaurantMenuItem],
        options: &[RestaurantCustomizationOption],
    ) -> Result<(), RepositoryError> {
        let conn = &mut self.connect()?;
        conn.transaction(|conn| {
            // Options go with their items through ON DELETE CASCADE.
            delete(
                schema::restaurant_menu_items::table
                    .filter(schema::restaurant_menu_items::restaurant_id.eq(rid)),
            )
            .execute(conn)?;
            insert_into(schema::restaurant_menu_items::table)
                .values(menu_items)
                .execute(conn)?;
            insert_into(schema::restaurant_customization_options::table)
                .values(options)
                .execute(conn)?;
            Ok(())
        })
    }
}
