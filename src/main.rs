use tracing_subscriber::EnvFilter;
use ytmp3_gateway::{Config, Server};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Load configuration from CLI, environment, and/or config file
    let config = Config::load()?;

    let server = Server::bind(&config).await?;
    server.serve().await
}
