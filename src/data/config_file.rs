use std::path::{Path, PathBuf};
use anyhow::Context;
use crate::common::ScorerConfig;
use crate::data::FsAccess;

pub const CONFIG_ENV: &str = "VIGIL_CONFIG";
pub const CONFIG_FILE: &str = "scorer.json";

/// Reads and validates a JSON scorer config. Missing fields take defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<ScorerConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: ScorerConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    log::info!("Loaded scorer config from {}", path.display());
    Ok(config)
}

/// `$VIGIL_CONFIG` if set, otherwise `<config dir>/vigil/scorer.json`.
pub fn default_config_path() -> anyhow::Result<PathBuf> {
    match std::env::var_os(CONFIG_ENV) {
        Some(p) => Ok(PathBuf::from(p)),
        None => Ok(FsAccess::Config.path()?.join(CONFIG_FILE)),
    }
}

/// Loads the config from [`default_config_path`], or defaults when no file
/// exists there. A file that exists but fails to parse is an error.
pub fn load_default_config() -> anyhow::Result<ScorerConfig> {
    let path = default_config_path()?;
    if path.exists() {
        load_config(&path)
    } else {
        log::info!("No config at {}, using defaults", path.display());
        Ok(ScorerConfig::default())
    }
}

pub fn save_config<P: AsRef<Path>>(config: &ScorerConfig, path: P) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path.as_ref(), json)
        .with_context(|| format!("writing config {}", path.as_ref().display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let cfg = ScorerConfig::new().with_input_size(320).with_layout(2100, 80).with_history_capacity(4);
        save_config(&cfg, &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), cfg);
    }

    #[test]
    fn invalid_values_are_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"debounce": {"max_hits": 1, "confirm_hits": 2}}"#).unwrap();
        assert!(load_config(&path).is_err());

        std::fs::write(&path, "not json").unwrap();
        assert!(load_config(&path).is_err());
    }
}
