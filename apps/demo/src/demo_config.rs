use std::env;
use std::time::Duration;

use pathguard_application::EngineConfig;
use pathguard_core::AppError;
use tracing_subscriber::EnvFilter;

const DEFAULT_MAX_DEPTH: usize = 3;
const DEFAULT_SNAPSHOT_TTL_SECONDS: u64 = 300;

#[derive(Debug, Clone, Copy)]
pub struct DemoConfig {
    pub engine: EngineConfig,
}

impl DemoConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let value = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let max_depth = value("PATHGUARD_MAX_DEPTH")
            .map(|raw| {
                raw.trim().parse::<usize>().map_err(|error| {
                    AppError::Validation(format!("invalid PATHGUARD_MAX_DEPTH: {error}"))
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_MAX_DEPTH);

        let ttl_seconds = value("PATHGUARD_SNAPSHOT_TTL_SECONDS")
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|error| {
                    AppError::Validation(format!(
                        "invalid PATHGUARD_SNAPSHOT_TTL_SECONDS: {error}"
                    ))
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_SNAPSHOT_TTL_SECONDS);
        let snapshot_ttl = (ttl_seconds > 0).then(|| Duration::from_secs(ttl_seconds));

        let cache_enabled =
            parse_flag("PATHGUARD_CACHE_ENABLED", value("PATHGUARD_CACHE_ENABLED"))?
                .unwrap_or(true);
        let anonymous_read =
            parse_flag("PATHGUARD_ANONYMOUS_READ", value("PATHGUARD_ANONYMOUS_READ"))?
                .unwrap_or(false);

        Ok(Self {
            engine: EngineConfig::new(max_depth, snapshot_ttl, cache_enabled, anonymous_read)?,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_flag(name: &str, raw: Option<String>) -> Result<Option<bool>, AppError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(Some(true)),
        "false" | "0" | "no" => Ok(Some(false)),
        other => Err(AppError::Validation(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}
