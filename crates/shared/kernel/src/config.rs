use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_STEM: &str = "engine";
const ENV_PREFIX: &str = "JAL";

#[jal_derive::jal_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Layered configuration loader.
///
/// 1. **Base file**: the given path (any format the `config` crate
///    recognises by extension). Without a path, an optional `engine.*` file
///    in the working directory is used when present.
/// 2. **Environment overrides**: variables prefixed `JAL__`, nested with
///    double underscores (`JAL__PRIORITY__P1_THRESHOLD=30` maps to
///    `priority.p1_threshold`).
///
/// Target types are expected to carry `#[serde(default)]`, so missing keys
/// fall back to their defaults.
///
/// # Errors
/// Returns [`ConfigError::Config`] when an explicitly given file is missing,
/// a source fails to parse, or the merged tree does not match `T`.
///
/// # Example
/// ```rust
/// use jal_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (effective_path, required) = path.map_or_else(
        || (PathBuf::from(DEFAULT_STEM), false),
        |p| (p.as_ref().to_path_buf(), true),
    );

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!(path = %effective_path.display(), required, "Loading engine config");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
