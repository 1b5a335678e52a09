use std::{thread::sleep, time::Duration};

use diesel::result::Error as DieselError;
use diesel::{
    Connection, ExpressionMethods, PgConnection, QueryDsl, RunQueryDsl, SelectableHelper,
};
use kafka::client::RequiredAcks;
use kafka::producer::{Producer, Record};
use thiserror::Error;
use tracing::{debug, info, warn};
use zapeat_restaurant_service::config::{establish_connection, Config};
use zapeat_restaurant_service::models::Outbox;
use zapeat_restaurant_service::schema;

#[derive(Error, Debug)]
pub enum OutboxProcessingError {
    #[error("outbox query failed: {0}")]
    Database(#[from] DieselError),
    #[error("kafka send failed: {0}")]
    Kafka(#[from] kafka::Error),
}

struct OutboxProcessor {
    kafka: Producer,
}

impl OutboxProcessor {
    /// Sends the oldest unsent row and deletes it. `Ok(false)` when the outbox is empty.
    fn process_next_outbox_row(
        &mut self,
        conn: &mut PgConnection,
    ) -> Result<bool, OutboxProcessingError> {
        use schema::outbox::dsl::*;

        conn.transaction::<_, OutboxProcessingError, _>(|conn| {
            let row = match outbox
                .select(Outbox::as_select())
                .order(id.asc())
                .for_update()
                .skip_locked()
                .first::<Outbox>(conn)
            {
                Ok(row) => row,
                Err(DieselError::NotFound) => return Ok(false),
                Err(err) => return Err(err.into()),
            };

            self.kafka.send(&Record::from_key_value(
                &row.topic,
                row.key.clone(),
                row.value.clone(),
            ))?;
            diesel::delete(outbox.filter(id.eq(row.id))).execute(conn)?;
            debug!(outbox_id = row.id, topic = %row.topic, "outbox row relayed");

            Ok(true)
        })
    }
}

pub fn main(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let conn = &mut establish_connection(&config.database_url)?;
    let producer = Producer::from_hosts(vec![config.kafka_url()?.to_string()])
        .with_ack_timeout(Duration::from_secs(1))
        .with_required_acks(RequiredAcks::One)
        .create()?;

    let mut outbox_processor = OutboxProcessor { kafka: producer };
    info!("relaying outbox");

    loop {
        match outbox_processor.process_next_outbox_row(conn) {
            Ok(true) => {}
            Ok(false) => sleep(Duration::from_secs(1)),
            Err(err) => {
                warn!(error = %err, "error processing outbox row");
                sleep(Duration::from_secs(1));
            }
        }
    }
}
