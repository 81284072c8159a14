use crate::args::FilterArgs;
use crate::commands::{open_store, Out};
use crate::export::display_date;
use crate::model::Transaction;
use crate::stats::grand_total;
use crate::{Config, Result};
use chrono_tz::Tz;
use std::fmt::Write;

/// Lists the transactions that pass the filter, newest first, as a table on stdout.
pub async fn list(config: Config, args: FilterArgs) -> Result<Out<Vec<Transaction>>> {
    let store = open_store(&config).await?;
    let filter = args.filter();
    let rows = filter.apply(store.snapshot());
    let message = format!(
        "{} of {} transactions, total {}",
        rows.len(),
        store.snapshot().len(),
        grand_total(&rows)
    );
    let table = table(&rows, config.timezone());
    Ok(Out::new(message, rows).with_report(table))
}

fn table(rows: &[Transaction], tz: Tz) -> String {
    let mut out = format!(
        "{:<32}  {:<10}  {:<24}  {:<22}  {:>12}  {:<14}  {}",
        "ID", "Fecha", "Sede", "Categoría", "Monto", "Folio", "Descripción"
    );
    for t in rows {
        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "\n{:<32}  {:<10}  {:<24}  {:<22}  {:>12}  {:<14}  {}{}",
            t.id,
            display_date(t.calendar_date(tz)),
            t.branch,
            t.category.to_string(),
            t.amount.to_string(),
            t.reference_number.as_deref().unwrap_or("-"),
            t.description,
            if t.has_receipt() { " [recibo]" } else { "" }
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::login;
    use crate::filter::Selection;
    use crate::test::{sample_snapshot, TestEnv};

    #[tokio::test]
    async fn test_list_filters() {
        let env = TestEnv::new().await;
        env.write_snapshot(&sample_snapshot()).await;
        login(&env.config(), "admin", "admin").await.unwrap();

        let args = FilterArgs {
            branch: Selection::Only("Engineering".to_string()),
            ..FilterArgs::default()
        };
        let out = list(env.config(), args).await.unwrap();
        assert_eq!(out.structure().unwrap().len(), 1);
        assert_eq!(out.message(), "1 of 2 transactions, total $45.00");
        let report = out.report().unwrap();
        assert_eq!(report.lines().count(), 2);
        assert!(report.contains("REC-2024-001"));
    }

    #[test]
    fn test_table_of_nothing_is_header() {
        let table = table(&[], chrono_tz::UTC);
        assert!(table.starts_with("ID"));
        assert_eq!(table.lines().count(), 1);
    }
}
