use anyhow::Context;
use clap::Parser;
use jal_replay::cli::Cli;
use jal_replay::registry::RegistryFile;
use jal_replay::{init_logger, replay_engine};
use jalsetu::domain::config::EngineConfig;
use jalsetu::kernel::config::load_config;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config: EngineConfig =
        load_config(cli.config.as_deref()).context("Critical: Configuration is malformed")?;
    let _log = init_logger(&config.log)?;

    let registry = tokio::fs::read_to_string(&cli.registry)
        .await
        .with_context(|| format!("reading registry {}", cli.registry.display()))?;
    let registry: RegistryFile = serde_json::from_str(&registry)
        .with_context(|| format!("parsing registry {}", cli.registry.display()))?;

    let mut replay = replay_engine(config, registry)?;
    let mut out = std::io::stdout().lock();

    let summary = match &cli.events {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening events {}", path.display()))?;
            replay.run(BufReader::new(file), &mut out).await?
        },
        None => replay.run(BufReader::new(tokio::io::stdin()), &mut out).await?,
    };

    if summary.failed > 0 {
        tracing::warn!(failed = summary.failed, "Some replay lines were rejected");
    }
    Ok(())
}
