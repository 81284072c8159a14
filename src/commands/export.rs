use crate::args::ExportArgs;
use crate::commands::{open_store, Out};
use crate::error::{ErrorType, IntoResult};
use crate::export::{self as report, ReportFormat};
use crate::{Config, Result};
use chrono::Utc;
use std::path::PathBuf;

/// Writes the filtered transactions as a report file and returns its path.
///
/// Exporting a filter that matches nothing still writes a header-only report. A file with the
/// same name from an earlier export on the same day is replaced.
pub async fn export(config: Config, args: ExportArgs) -> Result<Out<PathBuf>> {
    let store = open_store(&config).await?;
    let filter = args.filter.filter();
    let rows = filter.apply(store.snapshot());
    let now = Utc::now().with_timezone(&config.timezone());

    let artifact =
        report::export(args.format, &rows, &filter, now).pub_result(ErrorType::Export)?;
    let dir = args.out_dir.unwrap_or_else(|| config.exports_dir());
    let path = artifact.save(&dir).await.pub_result(ErrorType::Export)?;

    let kind = match args.format {
        ReportFormat::Xlsx => "spreadsheet",
        ReportFormat::Pdf => "document",
    };
    let message = format!(
        "Exported {} transactions to the {kind} {}",
        rows.len(),
        path.display()
    );
    Ok(Out::new(message, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::FilterArgs;
    use crate::commands::login;
    use crate::test::{sample_snapshot, TestEnv};

    #[tokio::test]
    async fn test_export_pdf_to_default_dir() {
        let env = TestEnv::new().await;
        env.write_snapshot(&sample_snapshot()).await;
        login(&env.config(), "admin", "admin").await.unwrap();

        let args = ExportArgs {
            format: ReportFormat::Pdf,
            filter: FilterArgs::default(),
            out_dir: None,
        };
        let out = export(env.config(), args).await.unwrap();
        let path = out.structure().unwrap();
        assert!(path.starts_with(env.config().exports_dir()));
        assert!(path.is_file());
        assert!(out.message().starts_with("Exported 2 transactions"));
    }

    #[tokio::test]
    async fn test_export_empty_xlsx() {
        let env = TestEnv::new().await;
        env.write_snapshot(&[]).await;
        login(&env.config(), "admin", "admin").await.unwrap();

        let out_dir = env.config().root().join("out");
        let args = ExportArgs {
            format: ReportFormat::Xlsx,
            filter: FilterArgs {
                search: Some("nada".to_string()),
                ..FilterArgs::default()
            },
            out_dir: Some(out_dir.clone()),
        };
        let out = export(env.config(), args).await.unwrap();
        let path = out.structure().unwrap();
        assert!(path.starts_with(&out_dir));
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("BiblioPay_Reporte_General_"));
        assert!(out.message().starts_with("Exported 0 transactions"));
    }
}
