//! Configuration resolution: CLI → env → XDG → defaults.
//!
//! The first existing file wins; environment overrides are applied on top of
//! whichever source was selected, then the result is validated.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::analytics::AnalyticsConfig;
use crate::validate::{ValidationError, ValidationResult};

/// Environment variable naming an explicit config file.
pub const ENV_CONFIG_PATH: &str = "MA_CONFIG";
/// Overrides `backend.base_url`.
pub const ENV_BACKEND_URL: &str = "MA_BACKEND_URL";
/// Overrides `backend.timeout_secs`.
pub const ENV_BACKEND_TIMEOUT: &str = "MA_BACKEND_TIMEOUT_SECS";
/// Overrides `noise.seed`.
pub const ENV_NOISE_SEED: &str = "MA_NOISE_SEED";
/// Any of `1`, `true`, `yes` disables the backend.
pub const ENV_BACKEND_DISABLED: &str = "MA_BACKEND_DISABLED";

const CONFIG_FILE_NAME: &str = "analytics.json";
const CONFIG_DIR_NAME: &str = "ma";

/// Candidate config locations, in precedence order.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// `--config` from the command line.
    pub explicit: Option<PathBuf>,
    /// Value of `MA_CONFIG`.
    pub env: Option<PathBuf>,
    /// `$XDG_CONFIG_HOME/ma/analytics.json`.
    pub xdg: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover paths from the process environment.
    pub fn discover(explicit: Option<PathBuf>) -> Self {
        Self {
            explicit,
            env: std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from),
            xdg: dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)),
        }
    }
}

/// Where the resolved configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ConfigSource {
    Cli(PathBuf),
    Env(PathBuf),
    Xdg(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn using_defaults(&self) -> bool {
        matches!(self, ConfigSource::Defaults)
    }
}

/// A validated configuration plus its provenance.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub config: AnalyticsConfig,
    pub source: ConfigSource,
    /// Names of environment overrides that were applied.
    pub overrides: Vec<String>,
}

/// Resolve configuration using the process environment for overrides.
pub fn resolve_config(paths: &ConfigPaths) -> ValidationResult<ResolvedConfig> {
    resolve_config_with(paths, |key| std::env::var(key).ok())
}

/// Resolve configuration with an injectable environment lookup.
///
/// An explicit or env-named path that does not exist is an error; a missing
/// XDG file silently falls through to defaults.
pub fn resolve_config_with<F>(paths: &ConfigPaths, lookup: F) -> ValidationResult<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let (mut config, source) = if let Some(path) = &paths.explicit {
        (load_required(path)?, ConfigSource::Cli(path.clone()))
    } else if let Some(path) = &paths.env {
        (load_required(path)?, ConfigSource::Env(path.clone()))
    } else if let Some(path) = paths.xdg.as_ref().filter(|p| p.is_file()) {
        (AnalyticsConfig::from_file(path)?, ConfigSource::Xdg(path.clone()))
    } else {
        (AnalyticsConfig::default(), ConfigSource::Defaults)
    };

    let overrides = apply_env_overrides(&mut config, &lookup)?;
    config.validate()?;

    Ok(ResolvedConfig {
        config,
        source,
        overrides,
    })
}

fn load_required(path: &Path) -> ValidationResult<AnalyticsConfig> {
    if !path.exists() {
        return Err(ValidationError::IoError(format!(
            "config file not found: {}",
            path.display()
        )));
    }
    AnalyticsConfig::from_file(path)
}

fn apply_env_overrides<F>(config: &mut AnalyticsConfig, lookup: &F) -> ValidationResult<Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = Vec::new();

    if let Some(url) = lookup(ENV_BACKEND_URL) {
        config.backend.base_url = url;
        applied.push(ENV_BACKEND_URL.to_string());
    }

    if let Some(raw) = lookup(ENV_BACKEND_TIMEOUT) {
        config.backend.timeout_secs = raw.trim().parse().map_err(|_| {
            ValidationError::invalid(ENV_BACKEND_TIMEOUT, format!("not an integer: {raw}"))
        })?;
        applied.push(ENV_BACKEND_TIMEOUT.to_string());
    }

    if let Some(raw) = lookup(ENV_NOISE_SEED) {
        let seed = raw.trim().parse().map_err(|_| {
            ValidationError::invalid(ENV_NOISE_SEED, format!("not an integer: {raw}"))
        })?;
        config.noise.seed = Some(seed);
        applied.push(ENV_NOISE_SEED.to_string());
    }

    if let Some(raw) = lookup(ENV_BACKEND_DISABLED) {
        if matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes") {
            config.backend.enabled = false;
            applied.push(ENV_BACKEND_DISABLED.to_string());
        }
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn no_files_uses_defaults() {
        let resolved = resolve_config_with(&ConfigPaths::default(), no_env).unwrap();
        assert!(resolved.source.using_defaults());
        assert_eq!(resolved.config, AnalyticsConfig::default());
        assert!(resolved.overrides.is_empty());
    }

    #[test]
    fn missing_xdg_falls_through() {
        let dir = tempdir().unwrap();
        let paths = ConfigPaths {
            xdg: Some(dir.path().join("missing.json")),
            ..Default::default()
        };
        let resolved = resolve_config_with(&paths, no_env).unwrap();
        assert!(resolved.source.using_defaults());
    }

    #[test]
    fn explicit_beats_env_and_xdg() {
        let dir = tempdir().unwrap();
        let cli = dir.path().join("cli.json");
        let env = dir.path().join("env.json");
        fs::write(&cli, r#"{"smoothing": {"alpha": 0.4}}"#).unwrap();
        fs::write(&env, r#"{"smoothing": {"alpha": 0.6}}"#).unwrap();

        let paths = ConfigPaths {
            explicit: Some(cli.clone()),
            env: Some(env),
            xdg: None,
        };
        let resolved = resolve_config_with(&paths, no_env).unwrap();
        assert_eq!(resolved.source, ConfigSource::Cli(cli));
        assert_eq!(resolved.config.smoothing.alpha, 0.4);
    }

    #[test]
    fn env_path_used_when_no_explicit() {
        let dir = tempdir().unwrap();
        let env = dir.path().join("env.json");
        fs::write(&env, r#"{"seasonality": {"period": 12}}"#).unwrap();
        let paths = ConfigPaths {
            env: Some(env.clone()),
            ..Default::default()
        };
        let resolved = resolve_config_with(&paths, no_env).unwrap();
        assert_eq!(resolved.source, ConfigSource::Env(env));
        assert_eq!(resolved.config.seasonality.period, 12);
    }

    #[test]
    fn missing_explicit_is_error() {
        let paths = ConfigPaths {
            explicit: Some(PathBuf::from("/nonexistent/cli.json")),
            ..Default::default()
        };
        let err = resolve_config_with(&paths, no_env).unwrap_err();
        assert!(matches!(err, ValidationError::IoError(_)));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let dir = tempdir().unwrap();
        let cli = dir.path().join("cli.json");
        fs::write(&cli, r#"{"anomaly": {"low": 3.0}}"#).unwrap();
        let paths = ConfigPaths {
            explicit: Some(cli),
            ..Default::default()
        };
        let err = resolve_config_with(&paths, no_env).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { .. }));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            (ENV_BACKEND_URL, "http://ml.internal:9000"),
            (ENV_BACKEND_TIMEOUT, "5"),
            (ENV_NOISE_SEED, "42"),
            (ENV_BACKEND_DISABLED, "true"),
        ]
        .into_iter()
        .collect();
        let resolved = resolve_config_with(&ConfigPaths::default(), |k| {
            env.get(k).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(resolved.config.backend.base_url, "http://ml.internal:9000");
        assert_eq!(resolved.config.backend.timeout_secs, 5);
        assert_eq!(resolved.config.noise.seed, Some(42));
        assert!(!resolved.config.backend.enabled);
        assert_eq!(resolved.overrides.len(), 4);
    }

    #[test]
    fn bad_timeout_override_is_error() {
        let err = resolve_config_with(&ConfigPaths::default(), |k| {
            (k == ENV_BACKEND_TIMEOUT).then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains(ENV_BACKEND_TIMEOUT));
    }

    #[test]
    fn zero_timeout_override_fails_validation() {
        let err = resolve_config_with(&ConfigPaths::default(), |k| {
            (k == ENV_BACKEND_TIMEOUT).then(|| "0".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("backend.timeout_secs"));
    }
}
