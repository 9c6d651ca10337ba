use mock_server::{Credentials, DEFAULT_PRIVATE_KEY, DEFAULT_PUBLIC_KEY};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let credentials = Credentials::new(
        std::env::var("MOCK_PUBLIC_KEY").unwrap_or_else(|_| DEFAULT_PUBLIC_KEY.to_string()),
        std::env::var("MOCK_PRIVATE_KEY").unwrap_or_else(|_| DEFAULT_PRIVATE_KEY.to_string()),
    );

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, public_key = %credentials.public_key, "mock comics API listening");
    mock_server::run(listener, credentials).await
}
