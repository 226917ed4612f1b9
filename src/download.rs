use crate::api::Download;
use crate::models::Caregiver;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

fn filename_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"filename\*?=(?:UTF-8'')?"?([^";]+)"?"#).unwrap())
}

/// File name from a `Content-Disposition` header. Only the last path
/// component is kept.
pub fn attachment_name(header: &str) -> Option<String> {
    let raw = filename_re().captures(header)?.get(1)?.as_str().trim();
    let name = Path::new(raw).file_name()?.to_str()?;
    Some(name.to_string())
}

/// Local name used when the server does not suggest one.
pub fn pdf_file_name(caregiver: &Caregiver, date: chrono::NaiveDate) -> String {
    format!(
        "caregiver_{}_{}.pdf",
        caregiver.display_id(),
        date.format("%Y-%m-%d")
    )
}

/// Writes the report into `dir`, creating it if needed, and returns the path.
pub fn save_pdf(dir: &Path, caregiver: &Caregiver, report: &Download) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let name = match &report.file_name {
        Some(name) => name.clone(),
        None => pdf_file_name(caregiver, chrono::Local::now().date_naive()),
    };
    let path = dir.join(name);
    fs::write(&path, &report.bytes)?;
    info!("saved {} bytes to {}", report.bytes.len(), path.display());
    Ok(path)
}
