//! Walkthrough binary for the field access engine.

mod demo_config;
mod demo_seed;

use pathguard_core::AppError;

use crate::demo_config::{DemoConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = DemoConfig::load()?;
    demo_seed::run(config).await
}
