//! Identity derivation for intake records.

const STORAGE_SCHEME: &str = "gs";
const PDF_SUFFIX: &str = ".pdf";

/// Database key for an object: the name with one trailing `.pdf` removed.
pub fn record_key(object_name: &str) -> &str {
    object_name.strip_suffix(PDF_SUFFIX).unwrap_or(object_name)
}

/// Fully-qualified locator for an object, e.g. `gs://bucket/path/file.pdf`.
pub fn source_locator(bucket: &str, object_name: &str) -> String {
    format!("{STORAGE_SCHEME}://{bucket}/{object_name}")
}
