use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::budget::{BudgetConfig, DEFAULT_UPLOAD_ENDPOINT};

pub const DEFAULT_API_BASE: &str = "https://zenodo.org/api/records";
pub const DEFAULT_RECORD_BASE: &str = "https://zenodo.org/records";
pub const DEFAULT_CATEGORY: &str = "Uploaded with zenodo2commons";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read config ({path:?}): {error}")]
    Read {
        error: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config ({path:?}): {error}")]
    Parse {
        error: serde_yaml::Error,
        path: PathBuf,
    },
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// Record metadata endpoint; `{api_base}/{id}` returns the record JSON.
    pub api_base: Url,
    /// Public landing pages, used as the `source` of uploads.
    pub record_base: Url,
    pub upload_endpoint: Url,
    pub categories: Vec<String>,
    pub budget: BudgetConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).unwrap(),
            record_base: Url::parse(DEFAULT_RECORD_BASE).unwrap(),
            upload_endpoint: Url::parse(DEFAULT_UPLOAD_ENDPOINT).unwrap(),
            categories: vec![DEFAULT_CATEGORY.to_owned()],
            budget: BudgetConfig::default(),
        }
    }
}

impl Config {
    pub fn from_yaml(src: &str, path: &Path) -> Result<Self, Error> {
        serde_yaml::from_str(src).map_err(|error| Error::Parse {
            error,
            path: path.to_owned(),
        })
    }

    pub async fn load(path: &Path) -> Result<Self, Error> {
        let src = tokio::fs::read_to_string(path)
            .await
            .map_err(|error| Error::Read {
                error,
                path: path.to_owned(),
            })?;
        Self::from_yaml(&src, path)
    }

    /// Landing page URL for a record, without a trailing slash.
    pub fn record_url(&self, id: &str) -> String {
        format!("{}/{id}", self.record_base.as_str().trim_end_matches('/'))
    }

    pub fn api_url(&self, id: &str) -> String {
        format!("{}/{id}", self.api_base.as_str().trim_end_matches('/'))
    }
}
