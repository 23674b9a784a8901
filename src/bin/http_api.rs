use lastfm_dupes::{api, clients::LastFmClient, config, scanner::Scanner};
use log::info;

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::init()?;

    let lastfm = LastFmClient::try_default()?;
    let app = api::router(Scanner::new(lastfm));

    let addr = std::env::var("HTTP_API_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server is running on http://{}/", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
