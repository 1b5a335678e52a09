use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tonic::transport::Server;
use tracing::info;
use zapeat_order_service::{
    config::{establish_connection, Config},
    repository::PgOrderRepository,
    rpc::OrderServiceImpl,
};
use zapeat_proto::order_service::order_service_server::OrderServiceServer;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

pub async fn main(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = establish_connection(&config.database_url)?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| format!("Failed to run migrations: {e}"))?;

    let order_service = OrderServiceImpl::new(PgOrderRepository::new(&config.database_url));

    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<OrderServiceServer<OrderServiceImpl<PgOrderRepository>>>()
        .await;

    info!("listening on {}", config.listen_addr);

    Server::builder()
        .add_service(health_service)
        .add_service(OrderServiceServer::new(order_service))
        .serve(config.listen_addr)
        .await?;

    Ok(())
}
