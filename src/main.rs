mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    lastfm_dupes::config::init()?;

    cli::run().await?;

    Ok(())
}
