use weekplan_api::{config, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL and the token secrets are picked up
    let _ = dotenvy::dotenv();
    server::init_tracing();

    server::serve(config::config().clone()).await
}
