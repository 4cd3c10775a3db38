use clap::ValueEnum;
use config::{Config, Environment};
use cortex::samples::SAMPLE_MARKER;
use serde::Deserialize;
use thiserror::Error;

const ENV_PREFIX: &str = "CORTEX";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {env_var}")]
    InvalidValue { env_var: String },

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

/// `samples.marker` becomes `CORTEX_SAMPLES__MARKER`
pub fn to_env_var(field: &str) -> String {
    format!(
        "{}_{}",
        ENV_PREFIX,
        field.to_uppercase().replace('.', "__")
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Deserialize)]
pub struct SampleSettings {
    pub marker: String,
}

#[derive(Debug, Deserialize)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub preview_chars: usize,
    pub sql_preview_chars: usize,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub samples: SampleSettings,
    pub output: OutputSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("samples.marker", SAMPLE_MARKER)?
            .set_default("output.format", "text")?
            .set_default("output.preview_chars", default_preview_chars())?
            .set_default("output.sql_preview_chars", default_sql_preview_chars())?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        match config.try_deserialize::<Self>() {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);
                match &err {
                    config::ConfigError::Type { key: Some(key), .. } => {
                        Err(ConfigError::InvalidValue {
                            env_var: to_env_var(key),
                        })
                    }
                    _ => Err(ConfigError::Other(err)),
                }
            }
        }
    }
}

fn default_preview_chars() -> i64 {
    200
}

fn default_sql_preview_chars() -> i64 {
    300
}
