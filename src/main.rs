use anyhow::Result;
use clap::{Parser, Subcommand};
use pennquinn::sanitize::Sanitizer;
use pennquinn::{config, db, importer};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import a WordPress WXR export into the post store
    Import {
        /// Path to the WXR XML file
        file: PathBuf,
        /// Only import posts published in this four-digit year
        #[arg(long)]
        year: Option<String>,
    },
    /// List stored posts, newest first
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| format!("sqlite://{}/blog.db", cfg.app.data_dir));

    let pool = db::init_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    match args.command {
        Command::Import { file, year } => {
            let sanitizer = Sanitizer::new(&cfg.import.legacy_hosts);
            let report = importer::run_import(
                &pool,
                &file,
                year.as_deref(),
                &sanitizer,
                cfg.import.batch_size,
            )
            .await?;
            info!(
                scanned = report.scanned,
                matched = report.matched,
                inserted = report.inserted,
                skipped = report.skipped,
                "import finished"
            );
        }
        Command::List => {
            for post in db::get_all(&pool).await? {
                println!("{:>6}  {:<19}  {}  /{}", post.id, post.date, post.title, post.slug);
            }
        }
    }

    Ok(())
}
