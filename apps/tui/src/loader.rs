use pseudodojo_core::{Catalog, DojoError, Notice};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const FILES_JSON: &str = "files.json";
pub const TARGZ_JSON: &str = "targz.json";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] DojoError),
}

/// Catalog plus the warning to show when it could not be loaded.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub catalog: Catalog,
    pub banner: Option<String>,
}

async fn read(path: PathBuf) -> Result<String, LoadError> {
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| LoadError::Read { path, source })
}

/// Reads both tables concurrently; nothing is returned until both are parsed.
pub async fn load_catalog(data_dir: &Path) -> Result<Catalog, LoadError> {
    let (files, archives) = tokio::join!(
        read(data_dir.join(FILES_JSON)),
        read(data_dir.join(TARGZ_JSON))
    );
    let catalog = Catalog::from_json(&files?, &archives?)?;
    log::debug!(
        "loaded {} elements from {}",
        catalog.element_count(),
        data_dir.display()
    );
    Ok(catalog)
}

/// Falls back to the empty catalog, where every lookup is unavailable.
pub async fn load_or_empty(data_dir: &Path) -> Loaded {
    match load_catalog(data_dir).await {
        Ok(catalog) => Loaded {
            catalog,
            banner: None,
        },
        Err(e) => {
            log::warn!("{e}");
            Loaded {
                catalog: Catalog::empty(),
                banner: Some(Notice::LoadFailed.message().to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pseudodojo_core::Choice;

    fn scratch_dir(name: &str) -> std::io::Result<PathBuf> {
        let dir = std::env::temp_dir().join(format!("pseudodojo-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    #[tokio::test]
    async fn loads_both_tables() -> Result<(), Box<dyn std::error::Error>> {
        let dir = scratch_dir("load")?;
        std::fs::write(
            dir.join(FILES_JSON),
            r#"{"nc-sr-v0.4":{"PBE":{"standard":{"Si":{"psp8":"Si.psp8"}}}}}"#,
        )?;
        std::fs::write(
            dir.join(TARGZ_JSON),
            r#"{"nc-sr-v0.4":{"PBE":{"standard":{"psp8":"all.tgz"}}}}"#,
        )?;

        let loaded = load_or_empty(&dir).await;
        let choice = Choice::new("nc-sr-v0.4", "PBE", "standard", "psp8");
        assert!(loaded.banner.is_none());
        assert_eq!(loaded.catalog.resolve_pseudo("Si", &choice), Some("Si.psp8"));
        assert_eq!(loaded.catalog.resolve_archive(&choice), Some("all.tgz"));

        std::fs::remove_dir_all(dir)?;
        Ok(())
    }

    #[tokio::test]
    async fn missing_archive_table_degrades_to_empty() -> Result<(), Box<dyn std::error::Error>> {
        let dir = scratch_dir("partial")?;
        std::fs::write(dir.join(FILES_JSON), "{}")?;
        let _ = std::fs::remove_file(dir.join(TARGZ_JSON));

        assert!(matches!(
            load_catalog(&dir).await,
            Err(LoadError::Read { .. })
        ));
        let loaded = load_or_empty(&dir).await;
        assert!(loaded.catalog.is_empty());
        assert_eq!(
            loaded.banner.as_deref(),
            Some(Notice::LoadFailed.message())
        );

        std::fs::remove_dir_all(dir)?;
        Ok(())
    }

    #[tokio::test]
    async fn malformed_table_is_a_parse_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = scratch_dir("malformed")?;
        std::fs::write(dir.join(FILES_JSON), "[1, 2")?;
        std::fs::write(dir.join(TARGZ_JSON), "{}")?;

        assert!(matches!(
            load_catalog(&dir).await,
            Err(LoadError::Parse(DojoError::Parse { .. }))
        ));

        std::fs::remove_dir_all(dir)?;
        Ok(())
    }
}
