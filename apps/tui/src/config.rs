use color_eyre::eyre::{eyre, Result};
use dotenv::dotenv;
use pseudodojo_core::{Layout, ProbeFailurePolicy};
use reqwest::Url;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://www.pseudo-dojo.org/";

/// Settings read from `.env`, the environment and command-line overrides.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub base_url: Url,
    pub database_url: String,
    pub download_dir: PathBuf,
    pub probe_failure: ProbeFailurePolicy,
    pub layout: Layout,
    pub debug: bool,
}

/// Initializes the application configuration
pub fn init_app_config() -> Result<AppConfig> {
    // Load environment variables from .env file
    dotenv().ok();

    let base_dir: PathBuf = env::current_dir()?;

    let db_name = env::var("DATABASE_NAME").unwrap_or_else(|_| "pseudodojo.db".to_string());
    let database_path = base_dir.join(&db_name);
    if let Some(parent) = database_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let raw_base = env::var("DOJO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let base_url = Url::parse(&raw_base).map_err(|e| eyre!("Invalid base URL {raw_base}: {e}"))?;

    let probe_failure = match env::var("PROBE_FAILURE") {
        Ok(value) => ProbeFailurePolicy::parse(&value)
            .ok_or_else(|| eyre!("PROBE_FAILURE must be `silent` or `notify`, got {value}"))?,
        Err(_) => ProbeFailurePolicy::default(),
    };

    Ok(AppConfig {
        data_dir: env::var("DOJO_DATA_DIR").map_or_else(|_| PathBuf::from("."), PathBuf::from),
        base_url,
        database_url: database_url(&database_path)?,
        download_dir: get_download_dir(),
        probe_failure,
        layout: Layout::from_param(env::var("DOJO_LAYOUT").ok().as_deref()),
        debug: env::var("DEBUG").is_ok_and(|value| !value.is_empty() && value != "0"),
    })
}

/// SQLx wants three slashes before an absolute path and two before a relative one.
pub fn database_url(path: &Path) -> Result<String> {
    let path_str = path
        .to_str()
        .ok_or_else(|| eyre!("Invalid database path"))?;
    let clean_path = path_str.trim_start_matches('/');

    if path.is_absolute() {
        log::debug!("Using absolute database path: {path_str}");
        Ok(format!("sqlite:///{clean_path}"))
    } else {
        log::debug!("Using relative database path: {path_str}");
        Ok(format!("sqlite://{clean_path}"))
    }
}

/// Gets the directory downloaded pseudopotentials are written to
pub fn get_download_dir() -> PathBuf {
    env::var("DOWNLOAD_DIR").map_or_else(|_| PathBuf::from("./downloads"), PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_paths_get_three_slashes() -> Result<()> {
        assert_eq!(
            database_url(Path::new("/var/lib/dojo/pseudodojo.db"))?,
            "sqlite:///var/lib/dojo/pseudodojo.db"
        );
        assert_eq!(
            database_url(Path::new("data/pseudodojo.db"))?,
            "sqlite://data/pseudodojo.db"
        );
        Ok(())
    }
}
