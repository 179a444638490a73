mod catalogue;
mod config;
mod db;
mod driver;
mod error;
mod models;
mod output;
mod stats;
mod store;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::{
    config::{Config, DEFAULT_CONFIG_PATH},
    db::{MongoStore, Neo4jStore},
    output::{OutputFormat, Printer},
};

#[derive(Parser)]
#[command(name = "filmgraph", version, about = "Canned film analytics over MongoDB and Neo4j")]
struct Cli {
    /// TOML settings file; environment variables override it
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the catalogue (the default)
    Run(RunArgs),
    /// List catalogue entries
    List,
    /// Check both database connections
    Ping,
}

#[derive(Args, Default)]
struct RunArgs {
    /// Only run the named entry; repeatable
    #[arg(long = "only", value_name = "NAME")]
    only: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,filmgraph=debug,neo4rs=warn,mongodb=warn".to_string()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::List => {
            Printer::new(std::io::stdout().lock(), cli.format).catalogue(catalogue::CATALOGUE)?;
        },
        Command::Ping => {
            let config = Config::load(&cli.config).context("loading configuration")?;
            ping(&config).await?;
        },
        Command::Run(args) => {
            let entries = driver::select(&args.only)?;
            let config = Config::load(&cli.config).context("loading configuration")?;

            // both connects ping their server, so an unreachable store stops the run here
            let mongo = MongoStore::connect(&config).await.context("connecting to MongoDB")?;
            let neo4j = Neo4jStore::connect(&config).await.context("connecting to Neo4j")?;

            let mut printer = Printer::new(std::io::stdout().lock(), cli.format);
            let report = driver::run(&entries, &config.demo, &mongo, &neo4j, &mut printer).await?;
            neo4j.close();

            tracing::info!(
                entries = report.entries.len(),
                failed = report.failures(),
                "run complete"
            );
        },
    }

    Ok(())
}

async fn ping(config: &Config) -> anyhow::Result<()> {
    let mut failed = false;

    match MongoStore::connect(config).await {
        Ok(_) => println!("MongoDB: ok"),
        Err(err) => {
            failed = true;
            println!("MongoDB: {err}");
        },
    }

    match Neo4jStore::connect(config).await {
        Ok(neo4j) => {
            match neo4j.ping().await {
                Ok(message) => println!("Neo4j: {message}"),
                Err(err) => {
                    failed = true;
                    println!("Neo4j: {err}");
                },
            }
            neo4j.close();
        },
        Err(err) => {
            failed = true;
            println!("Neo4j: {err}");
        },
    }

    if failed {
        anyhow::bail!("one or more stores unreachable");
    }
    Ok(())
}
