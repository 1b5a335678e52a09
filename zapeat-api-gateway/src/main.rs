use axum::Router;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use zapeat_proto::{
    auth_service::auth_service_client::AuthServiceClient,
    order_service::order_service_client::OrderServiceClient,
    restaurant_service::restaurant_service_client::RestaurantServiceClient,
};

mod config;
mod error;
mod handlers;
mod models;

use config::Config;
use handlers::{ApiDoc, AppState, auth_router, order_router, profile_router, restaurant_router};

fn app(state: AppState) -> Router {
    Router::new()
        .merge(auth_router())
        .merge(profile_router())
        .merge(restaurant_router())
        .merge(order_router())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let auth_client = AuthServiceClient::connect(config.auth_service_endpoint).await?;
    let restaurant_client =
        RestaurantServiceClient::connect(config.restaurant_service_endpoint).await?;
    let order_client = OrderServiceClient::connect(config.order_service_endpoint).await?;

    let state = AppState {
        auth_client,
        restaurant_client,
        order_client,
    };

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("API Gateway listening on {}", listener.local_addr()?);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
