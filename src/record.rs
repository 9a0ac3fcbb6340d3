use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(reqwest::Error),
    #[error("Record request failed ({url}): {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("Parse JSON error: {0}")]
    ParseJson(serde_json::Error),
    #[error("Not a record id, record URL or DOI: {0}")]
    InvalidRecordId(String),
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
enum ApiId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for ApiId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiId::Number(id) => write!(f, "{id}"),
            ApiId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiRecord {
    id: ApiId,
    pub metadata: ApiMetadata,
    #[serde(default)]
    pub files: Vec<ApiFile>,
}

impl ApiRecord {
    pub fn id(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub publication_date: String,
    #[serde(default)]
    pub creators: Vec<ApiCreator>,
    #[serde(default)]
    pub license: Option<ApiLicense>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiCreator {
    pub name: String,
    #[serde(default)]
    pub orcid: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiLicense {
    pub id: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiFile {
    pub key: String,
    #[serde(default)]
    pub size: u64,
    pub links: ApiFileLinks,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiFileLinks {
    #[serde(rename = "self")]
    pub download: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct File {
    pub name: String,
    pub size_bytes: u64,
    pub download_url: String,
}

impl File {
    pub fn human_size(&self) -> String {
        const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
        if self.size_bytes < 1024 {
            return format!("{} B", self.size_bytes);
        }
        let mut size = self.size_bytes as f64 / 1024.0;
        let mut unit = UNITS[0];
        for next in &UNITS[1..] {
            if size < 1024.0 {
                break;
            }
            size /= 1024.0;
            unit = next;
        }
        format!("{size:.1} {unit}")
    }
}

/// Record fields in the shape the upload pipeline consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub id: String,
    pub title: String,
    pub description_html: String,
    pub notes: Option<String>,
    pub publication_date: String,
    pub source_url: String,
    pub authors: String,
    pub license_id: String,
    pub files: Vec<File>,
}

impl RawRecord {
    pub fn from_api(record: ApiRecord, config: &Config) -> Self {
        let id = record.id();
        let ApiMetadata {
            title,
            description,
            notes,
            publication_date,
            creators,
            license,
        } = record.metadata;
        Self {
            source_url: config.record_url(&id),
            id,
            title,
            description_html: description.unwrap_or_default(),
            notes: notes.filter(|notes| !notes.trim().is_empty()),
            publication_date,
            authors: format_creators(&creators),
            license_id: license.map(|license| license.id).unwrap_or_default(),
            files: record
                .files
                .into_iter()
                .map(|file| File {
                    name: file.key,
                    size_bytes: file.size,
                    download_url: file.links.download,
                })
                .collect(),
        }
    }
}

pub fn parse_record(src: &str) -> Result<ApiRecord, Error> {
    serde_json::from_str(src).map_err(Error::ParseJson)
}

pub struct Client {
    client: reqwest::Client,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub async fn fetch(&self, config: &Config, id: &str) -> Result<ApiRecord, Error> {
        let url = config.api_url(id);
        debug!(url, "fetching record");
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(Error::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status { status, url });
        }
        let body = response.text().await.map_err(Error::Transport)?;
        trace!(body, "record response");
        parse_record(&body)
    }
}

static RECORD_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:zenodo\.|/records?/)(\d+)").unwrap());

/// Accepts a bare id, a record or API URL, or a DOI.
pub fn parse_record_id(input: &str) -> Result<String, Error> {
    let input = input.trim();
    if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(input.to_owned());
    }
    RECORD_ID
        .captures(input)
        .map(|caps| caps[1].to_owned())
        .ok_or_else(|| Error::InvalidRecordId(input.to_owned()))
}

/// `"Last, First"` becomes `"First Last"`; ORCID holders get an external link.
pub fn format_creators(creators: &[ApiCreator]) -> String {
    creators
        .iter()
        .map(|creator| {
            let name = match creator.name.split_once(',') {
                Some((last, first)) if !first.trim().is_empty() => {
                    format!("{} {}", first.trim(), last.trim())
                }
                _ => creator.name.trim().to_owned(),
            };
            match creator.orcid.as_deref().map(str::trim) {
                Some(orcid) if !orcid.is_empty() => {
                    format!("[https://orcid.org/{orcid} {name}]")
                }
                _ => name,
            }
        })
        .join(", ")
}

static FORBIDDEN_IN_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[#<>\[\]|{}/:\x00-\x1f\x7f]").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Makes a file name acceptable as a Commons page title.
pub fn sanitize_dest_file(name: &str) -> String {
    let name = WHITESPACE.replace_all(name.trim(), " ");
    FORBIDDEN_IN_TITLE.replace_all(&name, "-").into_owned()
}
