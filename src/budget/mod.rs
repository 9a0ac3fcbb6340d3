//! Builds Commons upload URLs that stay within a fixed length budget.
//!
//! The full template is tried first. If the URL is too long, content is cut
//! in a fixed order until it fits:
//!
//! 1. everything as-is
//! 2. tables truncated to a share of the remaining space
//! 3. tables dropped
//! 4. tables and notes dropped
//! 5. description truncated to whatever the skeleton leaves over
//!
//! The template skeleton (title, date, source, authors, record marker,
//! categories) and the fixed query parameters are never cut.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;

pub mod template;
pub mod truncate;

pub use template::{Content, Skeleton};
pub use truncate::{truncate_description, truncate_tables};

pub const MAX_URL_LENGTH: usize = 4000;
pub const MIN_TABLE_LENGTH: usize = 100;
pub const TABLE_SPACE_RATIO: f64 = 0.4;
pub const URL_ENCODING_MARGIN: usize = 100;

pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://commons.wikimedia.org/wiki/Special:Upload";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "upload URL cannot fit in {max} characters: fixed fields alone need {minimal} characters"
    )]
    BudgetUnsatisfiable { minimal: usize, max: usize },
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct BudgetConfig {
    pub max_url_length: usize,
    pub min_table_length: usize,
    pub table_space_ratio: f64,
    pub url_encoding_margin: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_url_length: MAX_URL_LENGTH,
            min_table_length: MIN_TABLE_LENGTH,
            table_space_ratio: TABLE_SPACE_RATIO,
            url_encoding_margin: URL_ENCODING_MARGIN,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UploadParams<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub notes: Option<&'a str>,
    pub tables: &'a str,
    pub date: &'a str,
    pub source: &'a str,
    pub authors: &'a str,
    pub record_id: &'a str,
    pub commons_license: &'a str,
    pub dest_file: &'a str,
    pub file_url: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetResult {
    pub url: String,
    pub was_truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Full,
    TruncateTables,
    DropTables,
    DropNotes,
}

const LADDER: [Step; 4] = [
    Step::Full,
    Step::TruncateTables,
    Step::DropTables,
    Step::DropNotes,
];

#[derive(Debug, Clone)]
pub struct Budgeter {
    budget: BudgetConfig,
    upload_endpoint: String,
    categories: Vec<String>,
}

impl Default for Budgeter {
    fn default() -> Self {
        Self::new(BudgetConfig::default(), DEFAULT_UPLOAD_ENDPOINT, Vec::new())
    }
}

impl Budgeter {
    pub fn new(
        budget: BudgetConfig,
        upload_endpoint: impl Into<String>,
        categories: Vec<String>,
    ) -> Self {
        Self {
            budget,
            upload_endpoint: upload_endpoint.into(),
            categories,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.budget,
            config.upload_endpoint.as_str(),
            config.categories.clone(),
        )
    }

    fn skeleton<'a>(&'a self, params: &UploadParams<'a>) -> Skeleton<'a> {
        Skeleton {
            title: params.title,
            date: params.date,
            source: params.source,
            authors: params.authors,
            record_id: params.record_id,
            categories: &self.categories,
        }
    }

    fn url(&self, params: &UploadParams<'_>, content: Content<'_>) -> String {
        let description = self.skeleton(params).render(content);
        let separator = if self.upload_endpoint.contains('?') {
            '&'
        } else {
            '?'
        };
        format!(
            "{}{separator}wpUploadDescription={}&wpLicense={}&wpDestFile={}&wpSourceType=url&wpUploadFileURL={}",
            self.upload_endpoint,
            urlencoding::encode(&description),
            urlencoding::encode(params.commons_license),
            urlencoding::encode(params.dest_file),
            urlencoding::encode(params.file_url),
        )
    }

    fn fits(&self, url: &str) -> bool {
        url.len() <= self.budget.max_url_length
    }

    /// URL for one ladder step, or `None` when the step does not apply.
    fn attempt(&self, step: Step, params: &UploadParams<'_>) -> Option<String> {
        let full = Content {
            description: params.description,
            notes: params.notes,
            tables: params.tables,
        };
        match step {
            Step::Full => Some(self.url(params, full)),
            Step::TruncateTables => {
                let skeleton = self
                    .url(params, Content { tables: "", ..full })
                    .len();
                let remaining = self
                    .budget
                    .max_url_length
                    .saturating_sub(skeleton)
                    .saturating_sub(self.budget.url_encoding_margin);
                let allotted = (remaining as f64 * self.budget.table_space_ratio).floor() as usize;
                let max_table_length = truncate::char_len(params.tables).min(allotted);
                if max_table_length <= self.budget.min_table_length {
                    debug!(max_table_length, "not enough room left for tables");
                    return None;
                }
                let tables = truncate_tables(params.tables, max_table_length);
                Some(self.url(params, Content { tables: &tables, ..full }))
            }
            Step::DropTables => Some(self.url(params, Content { tables: "", ..full })),
            Step::DropNotes => Some(self.url(
                params,
                Content {
                    description: params.description,
                    ..Default::default()
                },
            )),
        }
    }

    /// Last resort: only a truncated description next to the skeleton.
    ///
    /// Percent-encoding can make the description longer in the URL than its
    /// character budget suggests, so the budget shrinks in proportion to the
    /// measured overshoot until the URL fits.
    fn truncate_description_step(&self, params: &UploadParams<'_>) -> Result<String, Error> {
        let max = self.budget.max_url_length;
        let minimal = self.url(params, Content::default());
        if !self.fits(&minimal) {
            return Err(Error::BudgetUnsatisfiable {
                minimal: minimal.len(),
                max,
            });
        }

        let mut max_desc_length = max
            .saturating_sub(minimal.len())
            .saturating_sub(self.budget.url_encoding_margin);
        loop {
            let description = truncate_description(params.description, max_desc_length);
            let url = self.url(
                params,
                Content {
                    description: &description,
                    ..Default::default()
                },
            );
            if self.fits(&url) {
                return Ok(url);
            }
            if max_desc_length == 0 {
                break;
            }
            let available = max - minimal.len();
            let used = url.len() - minimal.len();
            debug!(max_desc_length, used, available, "truncated description still too long");
            max_desc_length = (max_desc_length * available / used).min(max_desc_length - 1);
        }
        warn!("no room for any description text; leaving it empty");
        Ok(minimal)
    }

    pub fn build(&self, params: &UploadParams<'_>) -> Result<BudgetResult, Error> {
        for step in LADDER {
            let Some(url) = self.attempt(step, params) else {
                continue;
            };
            if self.fits(&url) {
                if step != Step::Full {
                    warn!(?step, length = url.len(), "upload URL fits after truncation");
                }
                return Ok(BudgetResult {
                    url,
                    was_truncated: step != Step::Full,
                });
            }
            debug!(?step, length = url.len(), "upload URL over budget");
        }
        let url = self.truncate_description_step(params)?;
        warn!(length = url.len(), "upload URL fits after truncating the description");
        Ok(BudgetResult {
            url,
            was_truncated: true,
        })
    }
}

/// [`Budgeter::build`] with default limits and no categories.
pub fn build_constrained_upload_url(params: &UploadParams<'_>) -> Result<BudgetResult, Error> {
    Budgeter::default().build(params)
}
