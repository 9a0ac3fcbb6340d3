use std::fmt::Write;

use crate::{
    RecordText,
    budget::{Budgeter, MAX_URL_LENGTH, truncate},
    config::Config,
    record::{self, RawRecord},
    upload_urls,
};

fn fixture() -> RawRecord {
    let api = record::parse_record(include_str!("record.json")).unwrap();
    RawRecord::from_api(api, &Config::default())
}

fn upload_description(url: &str) -> String {
    let (_, query) = url.split_once('?').unwrap();
    let value = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("wpUploadDescription="))
        .unwrap();
    urlencoding::decode(value).unwrap().into_owned()
}

#[test]
fn test_record_from_api() {
    let record = fixture();
    assert_eq!(record.id, "1234567");
    assert_eq!(record.source_url, "https://zenodo.org/records/1234567");
    assert_eq!(
        record.authors,
        "[https://orcid.org/0000-0002-1825-0097 Josiah Carberry], Ada Lovelace"
    );
    assert_eq!(record.license_id, "cc-by-4.0");
    assert_eq!(record.files.len(), 2);
    assert_eq!(record.files[0].human_size(), "50.0 MiB");
}

#[test]
fn test_record_text() {
    let text = RecordText::from_record(&fixture());
    assert_eq!(
        text.converted.description,
        "Serial-section '''electron micrographs''' of the outer plexiform layer, acquired at 5\u{a0}nm/px.\n\
         Imaging was funded by the Δ-Retina consortium."
    );
    assert_eq!(
        text.notes.as_deref(),
        Some("Raw stacks are available on request.")
    );
    let blocks = text.converted.tables.split("\n\n").collect::<Vec<_>>();
    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].contains("! Study\n! Biosample"));
    assert!(blocks[0].contains("| C57BL/6J, ''P30''"));
    assert!(blocks[1].contains("! Analysis"));
}

#[test]
fn test_upload_urls() {
    let config = Config::default();
    let uploads = upload_urls(&fixture(), &Budgeter::from_config(&config));
    assert_eq!(uploads.len(), 2);

    let first = uploads[0].upload.as_ref().unwrap();
    assert!(!first.was_truncated);
    assert!(first.url.contains("&wpLicense=Cc-by-4.0&"));
    assert!(first.url.contains("&wpDestFile=retina%20overview.tif&"));
    let description = upload_description(&first.url);
    assert!(description.contains(
        "|author=[https://orcid.org/0000-0002-1825-0097 Josiah Carberry], Ada Lovelace\n"
    ));
    assert!(description.contains("Raw stacks are available on request."));
    assert!(description.contains("| Ultrastructure of rod spherules"));
    assert!(description.contains("[[Category:Uploaded with zenodo2commons]]"));

    let second = uploads[1].upload.as_ref().unwrap();
    assert!(second.url.contains("&wpDestFile=stack-01-.png&"));
}

#[test]
fn test_non_free_license_is_not_uploadable() {
    let mut record = fixture();
    record.license_id = "cc-by-nc-4.0".into();
    let uploads = upload_urls(&record, &Budgeter::default());
    assert_eq!(uploads.len(), 2);
    assert!(uploads.iter().all(|upload| upload.upload.is_none()));
    assert!(uploads.iter().all(|upload| upload.license.is_none()));
    assert!(
        uploads
            .iter()
            .all(|upload| upload.error.as_deref().unwrap().contains("cc-by-nc-4.0"))
    );
}

#[test]
fn test_oversized_file_does_not_block_siblings() {
    let mut record = fixture();
    record.files[1].download_url = format!("https://zenodo.org/{}", "x".repeat(5_000));

    let uploads = upload_urls(&record, &Budgeter::default());
    assert_eq!(uploads.len(), 2);

    let first = uploads[0].upload.as_ref().unwrap();
    assert!(first.url.len() <= MAX_URL_LENGTH);
    assert!(first.url.contains("&wpDestFile=retina%20overview.tif&"));
    assert!(uploads[0].error.is_none());

    assert!(uploads[1].upload.is_none());
    assert_eq!(uploads[1].license, Some("Cc-by-4.0"));
    let error = uploads[1].error.as_deref().unwrap();
    assert!(error.contains("cannot fit in 4000 characters"));
}

#[test]
fn test_budget_holds_for_huge_records() {
    let mut html = format!("<p>{}</p><table>", "z".repeat(10_000));
    for i in 0..200 {
        write!(html, "<tr><th>Sample {i}</th><td>Value &amp; more {i}</td></tr>").unwrap();
    }
    html.push_str("</table>");

    let mut record = fixture();
    record.description_html = html;
    record.notes = Some("<p>Note with a long tail. ".to_owned() + &"n ".repeat(2_000) + "</p>");

    let uploads = upload_urls(&record, &Budgeter::default());
    for upload in &uploads {
        let result = upload.upload.as_ref().unwrap();
        assert!(result.was_truncated);
        assert!(result.url.len() <= MAX_URL_LENGTH);
        assert!(result.url.contains("wpLicense=Cc-by-4.0"));
        assert!(result.url.contains("wpDestFile="));
        let description = upload_description(&result.url);
        assert!(description.contains("{{Information"));
        assert!(description.contains("<!-- zenodo-record: 1234567 -->"));
        assert!(description.contains(truncate::DESCRIPTION_TRUNCATED_NOTICE));
        assert!(!description.contains("Note with a long tail."));
    }
}

#[test]
fn test_tables_truncated_before_prose() {
    let mut html = String::from("<p>Short summary.</p><table>");
    for i in 0..200 {
        write!(html, "<tr><td>Row {i}</td></tr>").unwrap();
    }
    html.push_str("</table>");

    let mut record = fixture();
    record.description_html = html;
    record.notes = None;

    let uploads = upload_urls(&record, &Budgeter::default());
    let result = uploads[0].upload.as_ref().unwrap();
    assert!(result.was_truncated);
    assert!(result.url.len() <= MAX_URL_LENGTH);
    let description = upload_description(&result.url);
    assert!(description.contains("Short summary."));
    assert!(description.contains("| Row 0"));
    assert!(!description.contains("| Row 199"));
    assert!(description.contains(truncate::TABLES_TRUNCATED_NOTICE));
}
