use crate::commands::Cli;
use crate::config::Config;
use crate::convert::Converter;
use anyhow::Result;
use clap::Parser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

mod audio;
mod cd;
mod commands;
mod config;
mod convert;
mod cue;
mod error;
mod process;
mod tags;

pub mod built_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let logger = env_logger::builder()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_default_env()
        .build();

    let level = logger.filter();
    let pb = MultiProgress::new();

    LogWrapper::new(pb.clone(), logger).try_init()?;
    log::set_max_level(level);

    let config = Config::load(cli.config.as_deref()).await?;
    Converter::new(&cli, &config, pb).run().await?;

    Ok(())
}
