use costbook::{
    app::App,
    cli,
    config::{self, database},
    core::catalog,
    errors::Result,
    session::{DatabaseIdentityProvider, SessionGate},
};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load config.toml (missing file means defaults)
    let settings = config::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;

    // 4. Connect and make sure every table exists
    let db = database::create_connection(&settings.database_url())
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db).await?;
    let db = Arc::new(db);

    // 5. Seed the price database from config when it is empty
    let seeded = catalog::seed_price_catalog(&db, &settings.price_items).await?;
    if seeded > 0 {
        info!("Seeded {seeded} price items from config");
    }

    // 6. Session gate over the bundled provider
    let provider = Arc::new(DatabaseIdentityProvider::new(
        Arc::clone(&db),
        settings.auth.clone(),
    ));
    let gate = SessionGate::new(provider);
    gate.initialize().await;

    let app = App::new(db, gate);
    let args: Vec<String> = std::env::args().skip(1).collect();
    cli::run(&app, &args)
        .await
        .inspect_err(|e| error!("{e}"))
}
