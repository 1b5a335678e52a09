use diesel::{prelude::*, PgConnection};
use prost::Message;
use tracing::debug;
use zapeat_proto::restaurant_service::{
    restaurant_event, RestaurantCreatedEvent, RestaurantDeletedEvent, RestaurantEvent,
    RestaurantMenuRevisedEvent, RestaurantUpdatedEvent,
};

use crate::menu::load_menu;
use crate::schema;
use crate::{models, models::NewOutbox, EVENT_CHANNEL};

/// Writes catalog events to the outbox. Must be used inside the transaction
/// that made the change.
pub struct RestaurantEventPublisher<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> RestaurantEventPublisher<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    pub fn restaurant_created(&mut self, restaurant: &models::Restaurant) -> QueryResult<()> {
        self.publish(
            restaurant,
            restaurant_event::Event::RestaurantCreated(RestaurantCreatedEvent {
                id: restaurant.id.to_string(),
                name: restaurant.name.clone(),
            }),
        )
    }

    pub fn restaurant_updated(&mut self, restaurant: &models::Restaurant) -> QueryResult<()> {
        self.publish(
            restaurant,
            restaurant_event::Event::RestaurantUpdated(RestaurantUpdatedEvent {
                id: restaurant.id.to_string(),
                name: restaurant.name.clone(),
            }),
        )
    }

    pub fn restaurant_deleted(&mut self, restaurant: &models::Restaurant) -> QueryResult<()> {
        self.publish(
            restaurant,
            restaurant_event::Event::RestaurantDeleted(RestaurantDeletedEvent {
                id: restaurant.id.to_string(),
            }),
        )
    }

    /// Publishes the restaurant's whole current menu.
    pub fn menu_revised(&mut self, restaurant: &models::Restaurant) -> QueryResult<()> {
        let menu = load_menu(self.conn, restaurant)?;
        self.publish(
            restaurant,
            restaurant_event::Event::RestaurantMenuRevised(RestaurantMenuRevisedEvent {
                id: restaurant.id.to_string(),
                menu: Some(menu),
            }),
        )
    }

    fn publish(
        &mut self,
        restaurant: &models::Restaurant,
        event: restaurant_event::Event,
    ) -> QueryResult<()> {
        let event = RestaurantEvent { event: Some(event) };
        diesel::insert_into(schema::outbox::table)
            .values(NewOutbox {
                topic: EVENT_CHANNEL.to_string(),
                key: restaurant.id.to_string(),
                value: event.encode_to_vec(),
            })
            .execute(self.conn)?;
        debug!(restaurant_id = %restaurant.id, "restaurant event queued");
        Ok(())
    }
}
