use serde::Serialize;
use tracing::{info, warn};

use crate::{
    budget::{BudgetResult, Budgeter, UploadParams},
    convert::ConvertedText,
    record::{File, RawRecord},
};

pub mod budget;
pub mod config;
pub mod convert;
pub mod license;
pub mod record;

#[cfg(test)]
mod tests;

/// Upload link for one file of a record.
///
/// `upload` is `None` when the record license has no Commons counterpart,
/// or when the file's own fields cannot fit the URL budget; `error` then
/// says why.
#[derive(Debug, Clone, Serialize)]
pub struct FileUpload {
    pub file: File,
    pub license: Option<&'static str>,
    pub upload: Option<BudgetResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Converted record text shared by every file of the record.
#[derive(Debug, Clone)]
pub struct RecordText {
    pub converted: ConvertedText,
    pub notes: Option<String>,
}

impl RecordText {
    pub fn from_record(record: &RawRecord) -> Self {
        let mut converted = convert::convert(record.description_html.as_str());
        let notes = record.notes.as_deref().map(|notes| convert::convert(notes)).map(|notes| {
            converted.append_tables(&notes.tables);
            notes.description
        });
        Self {
            converted,
            notes: notes.filter(|notes| !notes.is_empty()),
        }
    }
}

/// Builds one upload link per file.
///
/// Budget failures are per file: a file whose download URL alone blows the
/// limit does not cost its siblings their links.
pub fn upload_urls(record: &RawRecord, budgeter: &Budgeter) -> Vec<FileUpload> {
    let license = license::commons_license(&record.license_id);
    if license.is_none() {
        warn!(
            record = record.id,
            license = record.license_id,
            "license has no Commons counterpart; files are not uploadable"
        );
    }
    let text = RecordText::from_record(record);

    record
        .files
        .iter()
        .map(|file| {
            let Some(commons_license) = license else {
                return FileUpload {
                    file: file.clone(),
                    license,
                    upload: None,
                    error: Some(format!(
                        "license {:?} has no Commons counterpart",
                        record.license_id
                    )),
                };
            };
            let dest_file = record::sanitize_dest_file(&file.name);
            let params = UploadParams {
                title: &record.title,
                description: &text.converted.description,
                notes: text.notes.as_deref(),
                tables: &text.converted.tables,
                date: &record.publication_date,
                source: &record.source_url,
                authors: &record.authors,
                record_id: &record.id,
                commons_license,
                dest_file: &dest_file,
                file_url: &file.download_url,
            };
            let (upload, error) = match budgeter.build(&params) {
                Ok(upload) => {
                    info!(
                        file = file.name,
                        length = upload.url.len(),
                        was_truncated = upload.was_truncated,
                        "built upload URL"
                    );
                    (Some(upload), None)
                }
                Err(e) => {
                    warn!(file = file.name, error = %e, "file is not uploadable");
                    (None, Some(e.to_string()))
                }
            };
            FileUpload {
                file: file.clone(),
                license,
                upload,
                error,
            }
        })
        .collect()
}
