//! OpenSASE Coupons - storefront coupon evaluation service

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use opensase_coupons::api;
use opensase_coupons::config::Config;
use opensase_coupons::repository::PgStore;
use opensase_coupons::CouponEngine;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = Config::from_env()?;
    let db = PgPoolOptions::new().max_connections(config.max_connections).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let engine = CouponEngine::new(Arc::new(PgStore::new(db)));
    let app = api::router(engine);

    let addr = config.listen_addr();
    tracing::info!(%addr, "OpenSASE Coupons listening");
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
