use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tonic::transport::Server;
use tracing::info;
use zapeat_auth_service::{
    config::{establish_connection, Config},
    rpc::AuthServiceImpl,
    sms::LogSmsSender,
    tokens::TokenIssuer,
};
use zapeat_proto::auth_service::auth_service_server::AuthServiceServer;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

pub async fn main(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = establish_connection(&config.database_url)?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| format!("Failed to run migrations: {e}"))?;

    let tokens = TokenIssuer::new(&config.secret_key, config.access_token_ttl, config.otp_ttl);
    let service = AuthServiceImpl::new(&config.database_url, tokens, LogSmsSender);

    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<AuthServiceServer<AuthServiceImpl<LogSmsSender>>>()
        .await;

    info!("listening on {}", config.listen_addr);

    Server::builder()
        .add_service(health_service)
        .add_service(AuthServiceServer::new(service))
        .serve(config.listen_addr)
        .await?;

    Ok(())
}
