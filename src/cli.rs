use clap::{Parser, Subcommand};
use lastfm_dupes::clients::{
    DataKind, LastFmClientBuilder,
    errors::{Error, Result},
};
use lastfm_dupes::duplicates::DuplicateGroup;
use lastfm_dupes::scanner::Scanner;
use log::info;

#[derive(Parser)]
#[command(name = "lastfm-dupes")]
#[command(version, about = "Find duplicate albums and tracks in a Last.fm library", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a user's chart and list titles scrobbled under several versions
    Scan {
        /// Last.fm username
        username: String,

        /// Which chart to scan
        #[arg(short, long, value_enum, default_value_t = DataKind::Albums)]
        kind: DataKind,

        /// Print the groups as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Pages requested from Last.fm at the same time
        #[arg(long)]
        concurrency: Option<usize>,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            username,
            kind,
            json,
            concurrency,
        } => scan(&username, kind, json, concurrency).await,
    }
}

async fn scan(username: &str, kind: DataKind, json: bool, concurrency: Option<usize>) -> Result<()> {
    info!("Building Last.fm client ...");
    let mut builder = LastFmClientBuilder::from_env()?;
    if let Some(concurrency) = concurrency {
        builder = builder.concurrency(concurrency);
    }
    let scanner = Scanner::new(builder.build()?);

    let groups = scanner.scan(username, kind).await?;

    if json {
        println!("{}", render_json(&groups)?);
    } else if groups.is_empty() {
        println!("No duplicate {kind} found for {username}");
    } else {
        for group in &groups {
            print!("{}", render_group(group));
        }
    }
    Ok(())
}

fn render_json(groups: &[DuplicateGroup]) -> Result<String> {
    serde_json::to_string_pretty(groups).map_err(Error::Serialization)
}

fn scrobbles(count: u64) -> String {
    if count == 1 {
        "1 scrobble".to_string()
    } else {
        format!("{count} scrobbles")
    }
}

fn render_group(group: &DuplicateGroup) -> String {
    let mut out = format!(
        "{} - {} ({} versions, {})\n",
        group.artist,
        group.base_title,
        group.version_count,
        scrobbles(group.total_playcount)
    );
    for version in &group.versions {
        out.push_str(&format!(
            "    {} ({}) {}\n",
            version.title,
            scrobbles(version.playcount),
            version.url
        ));
    }
    out
}
