//! Web search launcher
//!
//! Builds a search URL from a template and hands it to the platform's URL
//! opener. Launch failures are logged, never reported back to the loop.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::assistant::SearchLauncher;
use crate::config::SearchConfig;
use crate::{Error, Result};

/// Placeholder replaced by the encoded query
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Default search URL template
pub const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search?q={query}";

/// Opens searches in the default browser
#[derive(Debug, Clone)]
pub struct BrowserSearch {
    url_template: String,
    open_browser: bool,
}

impl BrowserSearch {
    /// Create a launcher from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the URL template has no `{query}` placeholder
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        if !config.url_template.contains(QUERY_PLACEHOLDER) {
            return Err(Error::Config(format!(
                "search URL template must contain {QUERY_PLACEHOLDER}: {}",
                config.url_template
            )));
        }

        Ok(Self {
            url_template: config.url_template.clone(),
            open_browser: config.open_browser,
        })
    }

    /// Build the search URL for a query
    #[must_use]
    pub fn url_for(&self, query: &str) -> String {
        self.url_template
            .replace(QUERY_PLACEHOLDER, &urlencoding::encode(query.trim()))
    }

    /// Open a URL with the platform opener
    async fn open(url: &str) -> Result<()> {
        let (program, args) = opener()?;

        let status = tokio::process::Command::new(&program)
            .args(args)
            .arg(url)
            .status()
            .await
            .map_err(|e| Error::Search(format!("failed to run {}: {e}", program.display())))?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Search(format!(
                "{} exited with code {}",
                program.display(),
                status.code().unwrap_or(-1)
            )))
        }
    }
}

#[async_trait(?Send)]
impl SearchLauncher for BrowserSearch {
    async fn search(&self, query: &str) {
        let url = self.url_for(query);

        if !self.open_browser {
            tracing::info!(%url, "web search ready (browser disabled)");
            return;
        }

        tracing::info!(%url, "opening web search");
        if let Err(e) = Self::open(&url).await {
            tracing::warn!(error = %e, %url, "failed to open web search");
        }
    }
}

type Opener = (&'static str, &'static [&'static str]);

const MACOS_OPENERS: &[Opener] = &[("open", &[])];
const WINDOWS_OPENERS: &[Opener] = &[("cmd", &["/C", "start", ""])];
const UNIX_OPENERS: &[Opener] = &[
    ("xdg-open", &[]),
    ("gio", &["open"]),
    ("sensible-browser", &[]),
];

/// Locate the URL opener for this platform
fn opener() -> Result<(PathBuf, &'static [&'static str])> {
    let candidates = match std::env::consts::OS {
        "macos" => MACOS_OPENERS,
        "windows" => WINDOWS_OPENERS,
        _ => UNIX_OPENERS,
    };

    candidates
        .iter()
        .find_map(|(bin, args)| which::which(bin).ok().map(|path| (path, *args)))
        .ok_or_else(|| Error::Search("no URL opener found on PATH".to_string()))
}
