use std::{thread::sleep, time::Duration};

use kafka::{
    client::{FetchOffset, GroupOffsetStorage},
    consumer::Consumer,
};
use prost::Message;
use tracing::{info, warn};
use zapeat_order_service::{
    config::Config,
    replica::{apply_restaurant_event, ReplicaError},
    repository::PgOrderRepository,
    RESTAURANT_EVENT_CHANNEL,
};
use zapeat_proto::restaurant_service::RestaurantEvent;

const GROUP: &str = "order-service";

pub fn main(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let repository = PgOrderRepository::new(&config.database_url);
    let mut consumer = Consumer::from_hosts(vec![config.kafka_url()?.to_string()])
        .with_topic(RESTAURANT_EVENT_CHANNEL.to_string())
        .with_group(GROUP.to_string())
        .with_fallback_offset(FetchOffset::Earliest)
        .with_offset_storage(Some(GroupOffsetStorage::Kafka))
        .create()?;

    info!(topic = RESTAURANT_EVENT_CHANNEL, "consuming");

    loop {
        let mss = consumer.poll()?;
        if mss.is_empty() {
            sleep(Duration::from_secs(1));
            continue;
        }

        for ms in mss.iter() {
            for m in ms.messages() {
                let event = match RestaurantEvent::decode(m.value) {
                    Ok(event) => event,
                    Err(err) => {
                        warn!(offset = m.offset, error = %err, "skipping undecodable restaurant event");
                        continue;
                    }
                };
                match apply_restaurant_event(&repository, event) {
                    Ok(()) => {}
                    Err(ReplicaError::Malformed(reason)) => {
                        warn!(offset = m.offset, %reason, "skipping restaurant event");
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            consumer.consume_messageset(ms)?;
        }
        consumer.commit_consumed()?;
    }
}
