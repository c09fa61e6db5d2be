use clap::{Parser, Subcommand};
use media_toot::catalog::Catalog;
use media_toot::config::{self, Config};
use media_toot::imaging::RustBackend;
use media_toot::ledger::VisitedLedger;
use media_toot::mastodon::MastodonClient;
use media_toot::metadata::MetadataStore;
use media_toot::output;
use media_toot::pipeline::Pipeline;
use media_toot::poster::Poster;
use media_toot::retry::deliver;
use media_toot::select::{SelectionStrategy, SequentialOrder};
use media_toot::store::{JsonFileStore, StoreError};
use media_toot::text::compose_post;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "media-toot")]
#[command(about = "Post one unvisited image or video to Mastodon")]
#[command(long_about = "\
Post one unvisited image or video to Mastodon

Each run picks one media file that has not been posted yet, builds a status
from the configured description, the metadata database and the file's
directory names, uploads it (scaled down if too wide) and records it as
visited. Meant to be run from cron or a systemd timer.

Media layout:

  media/
  ├── cats/
  │   ├── 01.jpg                   # posted with #cats
  │   └── black and white/
  │       └── 02.png               # posted with #cats #black #and #white
  └── clips/
      └── purr.mp4                 # posted with #clips #video

Supported: gif png jpg jpeg mp4 mov webm.

Run 'media-toot gen-config' to generate a documented config.toml.
Set RUST_LOG=debug for a detailed trace on stderr.")]
#[command(version)]
struct Cli {
    /// Path to config.toml
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Post the next unvisited item (the default)
    Post,
    /// Show what the next sequential run would post, without posting
    Check,
    /// Post a text-only status
    Say {
        /// Status text
        message: String,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Post) {
        Command::Post => {
            let config = config::load_config(&cli.config)?;
            let secrets = config::load_secrets(&config.secrets)?;
            let client = MastodonClient::new(
                &secrets.mastodon_hostname,
                &secrets.access_token,
                config.visibility,
                config.http_timeout(),
            )?;
            let metadata = open_metadata(&config)?;
            let mut ledger = open_ledger(&config, true)?;
            let catalog = Catalog::build(&config.image_dir, &ledger)?;
            let backend = RustBackend::new();
            let mut strategy = config.order.strategy();

            let outcome = Pipeline::new(
                &client,
                &backend,
                &metadata,
                &mut ledger,
                config.pipeline_options(),
            )
            .run(&catalog, strategy.as_mut())?;
            output::print_outcome(&outcome, config.max_width);
        }
        Command::Check => {
            let config = config::load_config(&cli.config)?;
            let secrets = config::load_secrets(&config.secrets)?;
            info!("would post to {}", secrets.mastodon_hostname);
            let metadata = open_metadata(&config)?;
            let ledger = open_ledger(&config, false)?;
            let catalog = Catalog::build(&config.image_dir, &ledger)?;

            let options = config.pipeline_options();
            let next = SequentialOrder.select(&catalog.candidates).map(|item| {
                let text = compose_post(
                    &options.compose,
                    &metadata.lookup(&item.id),
                    &catalog.root,
                    item,
                );
                (item, text)
            });
            output::print_check_output(
                &catalog,
                next.as_ref().map(|(item, text)| (*item, text.as_str())),
            );
        }
        Command::Say { message } => {
            let config = config::load_config(&cli.config)?;
            let secrets = config::load_secrets(&config.secrets)?;
            let client = MastodonClient::new(
                &secrets.mastodon_hostname,
                &secrets.access_token,
                config.visibility,
                config.http_timeout(),
            )?;
            let delivery = deliver(config.retry_policy(), |_| client.post_text(&message));
            output::print_say_output(&delivery);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr, filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Open the metadata database named in the config, if any.
fn open_metadata(config: &Config) -> Result<MetadataStore, StoreError> {
    match config.infodb_path() {
        Some(path) => Ok(MetadataStore::new(Box::new(JsonFileStore::open(
            path, false,
        )?))),
        None => Ok(MetadataStore::none()),
    }
}

/// Open the visited ledger, honoring keys written by older versions.
fn open_ledger(config: &Config, auto_dump: bool) -> Result<VisitedLedger, StoreError> {
    Ok(
        VisitedLedger::new(Box::new(JsonFileStore::open(&config.visited_db, auto_dump)?))
            .with_legacy_prefix(&config.legacy_ledger_prefix()),
    )
}
