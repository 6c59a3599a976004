use futures::stream::{self, StreamExt};
use pseudodojo_core::download_name;
use reqwest::{redirect, Client, StatusCode, Url};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const TIMEOUT_SECS: u64 = 15;

/// Links checked at once by [`Prober::check_links`].
pub const CHECK_CONCURRENCY: usize = 16;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid link {link}: {reason}")]
    InvalidLink { link: String, reason: String },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server answered {status} for {url}")]
    Status { url: Url, status: StatusCode },
    #[error("failed to write download: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of probing one table link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStatus {
    pub link: String,
    pub status: Option<u16>,
    pub error: Option<String>,
}

impl LinkStatus {
    pub fn is_broken(&self) -> bool {
        !self.status.is_some_and(is_reachable)
    }
}

/// Any status below 400 counts as reachable, redirects included.
const fn is_reachable(status: u16) -> bool {
    status < 400
}

/// HTTP side of the browser: existence probes and downloads.
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
    base_url: Url,
}

impl Prober {
    pub fn new(base_url: Url) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(10))
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Resolves a table link; absolute links are kept, relative ones join the base URL.
    pub fn resolve(&self, link: &str) -> Result<Url, ProbeError> {
        self.base_url
            .join(link)
            .map_err(|e| ProbeError::InvalidLink {
                link: link.to_string(),
                reason: e.to_string(),
            })
    }

    async fn head(&self, link: &str) -> Result<StatusCode, ProbeError> {
        let url = self.resolve(link)?;
        let response = self.client.head(url).send().await?;
        Ok(response.status())
    }

    /// Whether the link currently answers; any failure counts as absent.
    pub async fn exists(&self, link: &str) -> bool {
        match self.head(link).await {
            Ok(status) => {
                log::debug!("probe {link}: {status}");
                is_reachable(status.as_u16())
            }
            Err(e) => {
                log::debug!("probe {link} failed: {e}");
                false
            }
        }
    }

    /// Fetches the link into `dir`, named after its last path segment.
    pub async fn download(&self, link: &str, dir: &Path) -> Result<PathBuf, ProbeError> {
        let url = self.resolve(link)?;
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status { url, status });
        }
        let bytes = response.bytes().await?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(download_name(url.path()));
        tokio::fs::write(&path, &bytes).await?;
        log::debug!("saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Probes every link with bounded concurrency, returning results in input order.
    pub async fn check_links(&self, links: Vec<String>, concurrency: usize) -> Vec<LinkStatus> {
        let mut statuses: Vec<(usize, LinkStatus)> = stream::iter(links.into_iter().enumerate())
            .map(|(index, link)| async move {
                let status = match self.head(&link).await {
                    Ok(status) => LinkStatus {
                        link,
                        status: Some(status.as_u16()),
                        error: None,
                    },
                    Err(e) => LinkStatus {
                        link,
                        status: None,
                        error: Some(e.to_string()),
                    },
                };
                (index, status)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        statuses.sort_by_key(|(index, _)| *index);
        statuses.into_iter().map(|(_, status)| status).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prober() -> Result<Prober, Box<dyn std::error::Error>> {
        Ok(Prober::new(Url::parse("https://www.pseudo-dojo.org/")?)?)
    }

    #[test]
    fn relative_links_join_the_base() -> Result<(), Box<dyn std::error::Error>> {
        let prober = prober()?;
        assert_eq!(
            prober.resolve("pseudos/nc-sr-04_pbe_standard.tgz")?.as_str(),
            "https://www.pseudo-dojo.org/pseudos/nc-sr-04_pbe_standard.tgz"
        );
        assert_eq!(
            prober.resolve("https://raw.example.org/Si.psp8")?.as_str(),
            "https://raw.example.org/Si.psp8"
        );
        Ok(())
    }

    #[test]
    fn broken_means_missing_or_error_status() {
        let status = |status: Option<u16>| LinkStatus {
            link: "x".to_string(),
            status,
            error: None,
        };
        assert!(!status(Some(200)).is_broken());
        assert!(!status(Some(302)).is_broken());
        assert!(status(Some(404)).is_broken());
        assert!(status(None).is_broken());
    }

    #[tokio::test]
    async fn unresolvable_links_are_reported() -> Result<(), Box<dyn std::error::Error>> {
        let prober = Prober::new(Url::parse("data:text/plain,base")?)?;
        let statuses = prober
            .check_links(vec!["relative/Si.psp8".to_string()], CHECK_CONCURRENCY)
            .await;
        assert_eq!(statuses.len(), 1);
        assert!(statuses[0].is_broken());
        assert!(statuses[0].error.is_some());
        Ok(())
    }
}
