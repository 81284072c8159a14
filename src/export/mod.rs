//! Report exporters.
//!
//! Both exporters take the snapshot *as already filtered* together with the filter that produced
//! it. The filter is only used for labels and file names; the exporters never look at the store.

mod document;
mod spreadsheet;

pub use document::DocumentReport;
pub use spreadsheet::SpreadsheetRow;

use crate::filter::Filter;
use crate::model::Transaction;
use crate::{utils, Result};
use chrono::{DateTime, Datelike, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The two artifact formats.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// A spreadsheet with one row per transaction.
    Xlsx,
    /// A paginated document with a filter header and a total footer.
    Pdf,
}

serde_plain::derive_display_from_serialize!(ReportFormat);
serde_plain::derive_fromstr_from_deserialize!(ReportFormat);

/// An exported report that has not been written anywhere yet.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Writes the artifact into `dir`, creating the directory if needed. An existing file with
    /// the same name is replaced.
    pub async fn save(&self, dir: &Path) -> Result<PathBuf> {
        utils::make_dir(dir).await?;
        let path = dir.join(&self.file_name);
        utils::write(&path, &self.bytes).await?;
        debug!("Wrote {} bytes to {}", self.bytes.len(), path.display());
        Ok(path)
    }
}

/// Renders `records` in `format`. `now` is the generation time in the operator's timezone and
/// determines the date in the file name.
pub fn export(
    format: ReportFormat,
    records: &[Transaction],
    filter: &Filter,
    now: DateTime<Tz>,
) -> Result<Artifact> {
    match format {
        ReportFormat::Xlsx => Ok(Artifact {
            file_name: spreadsheet_file_name(filter, now.date_naive()),
            bytes: spreadsheet::render(records, now.timezone())?,
        }),
        ReportFormat::Pdf => Ok(Artifact {
            file_name: document_file_name(now.date_naive()),
            bytes: DocumentReport::new(records, filter, now).render()?,
        }),
    }
}

/// `BiblioPay_Reporte_<General|branch>_<YYYY-MM-DD>.xlsx`, with whitespace runs in the branch
/// replaced by `_`.
pub fn spreadsheet_file_name(filter: &Filter, date: NaiveDate) -> String {
    let scope = match filter.branch.only() {
        Some(branch) => branch.split_whitespace().collect::<Vec<_>>().join("_"),
        None => "General".to_string(),
    };
    format!("BiblioPay_Reporte_{scope}_{}.xlsx", date.format("%Y-%m-%d"))
}

/// `Reporte_BiblioPay_<YYYY-MM-DD>.pdf`
pub fn document_file_name(date: NaiveDate) -> String {
    format!("Reporte_BiblioPay_{}.pdf", date.format("%Y-%m-%d"))
}

/// A date the way the reports show it, day first with no padding, e.g. `5/3/2025`.
pub fn display_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}

/// The "applied filters" line of the document header.
pub fn describe_filter(filter: &Filter) -> String {
    if filter.is_unrestricted() {
        return "Ninguno (Reporte General)".to_string();
    }
    let mut parts = Vec::new();
    if let Some(branch) = filter.branch.only() {
        parts.push(format!("Sede: {branch}"));
    }
    if let Some(category) = filter.category.only() {
        parts.push(format!("Categoría: {category}"));
    }
    if !filter.search.is_empty() {
        parts.push(format!("Búsqueda: \"{}\"", filter.search));
    }
    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::test::sample_snapshot;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Tz> {
        chrono_tz::America::Mexico_City
            .with_ymd_and_hms(2025, 3, 5, 18, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_file_names() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(
            spreadsheet_file_name(&Filter::all(), date),
            "BiblioPay_Reporte_General_2025-03-05.xlsx"
        );
        assert_eq!(
            spreadsheet_file_name(&Filter::all().branch("Facultad de  Medicina"), date),
            "BiblioPay_Reporte_Facultad_de_Medicina_2025-03-05.xlsx"
        );
        assert_eq!(document_file_name(date), "Reporte_BiblioPay_2025-03-05.pdf");
    }

    #[test]
    fn test_display_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(display_date(date), "5/3/2025");
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(display_date(date), "31/12/2024");
    }

    #[test]
    fn test_describe_filter() {
        assert_eq!(describe_filter(&Filter::all()), "Ninguno (Reporte General)");
        let filter = Filter::all()
            .branch("Campus Norte")
            .category(Category::Fines)
            .search("libro");
        assert_eq!(
            describe_filter(&filter),
            "Sede: Campus Norte | Categoría: Multas | Búsqueda: \"libro\""
        );
        assert_eq!(
            describe_filter(&Filter::all().search("x")),
            "Búsqueda: \"x\""
        );
    }

    #[test]
    fn test_export_names_follow_format() {
        let records = sample_snapshot();
        let filter = Filter::all();
        let xlsx = export(ReportFormat::Xlsx, &records, &filter, now()).unwrap();
        assert!(xlsx.file_name.ends_with(".xlsx"));
        assert!(xlsx.bytes.starts_with(b"PK"));
        let pdf = export(ReportFormat::Pdf, &records, &filter, now()).unwrap();
        assert_eq!(pdf.file_name, "Reporte_BiblioPay_2025-03-05.pdf");
        assert!(pdf.bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_artifact_save_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("exports");
        let artifact = Artifact {
            file_name: "a.pdf".to_string(),
            bytes: b"one".to_vec(),
        };
        let path = artifact.save(&out).await.unwrap();
        let again = Artifact {
            bytes: b"two".to_vec(),
            ..artifact
        };
        assert_eq!(again.save(&out).await.unwrap(), path);
        assert_eq!(utils::read(&path).await.unwrap(), "two");
    }

    #[test]
    fn test_report_format_from_str() {
        assert_eq!("pdf".parse::<ReportFormat>().unwrap(), ReportFormat::Pdf);
        assert_eq!(ReportFormat::Xlsx.to_string(), "xlsx");
    }
}
