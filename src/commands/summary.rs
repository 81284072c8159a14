use crate::args::SummaryArgs;
use crate::commands::{open_store, Out};
use crate::export::display_date;
use crate::model::Amount;
use crate::stats::{Charts, Dashboard};
use crate::{Config, Result};
use chrono::Utc;
use serde::Serialize;
use std::fmt::Write;

const BAR_WIDTH: f64 = 40.0;

/// The dashboard figures and chart data.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub dashboard: Dashboard,
    pub charts: Charts,
}

/// Computes the dashboard for `args.date` (today by default) and renders the two charts as text.
pub async fn summary(config: Config, args: SummaryArgs) -> Result<Out<Summary>> {
    let store = open_store(&config).await?;
    let tz = config.timezone();
    let today = args
        .date
        .unwrap_or_else(|| Utc::now().with_timezone(&tz).date_naive());
    let summary = Summary {
        dashboard: Dashboard::new(store.snapshot(), today, tz),
        charts: Charts::new(store.snapshot()),
    };
    let report = render(&summary);
    let message = format!(
        "Total {} from {} transactions",
        summary.dashboard.total,
        store.snapshot().len()
    );
    Ok(Out::new(message, summary).with_report(report))
}

fn render(summary: &Summary) -> String {
    let d = &summary.dashboard;
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "Ingresos del día ({}): {}", display_date(d.date), d.total_today);
    let _ = writeln!(out, "Total acumulado: {}", d.total);
    let _ = writeln!(out, "Transacciones hoy: {}", d.count_today);
    let _ = writeln!(out, "Sedes activas: {}", d.active_branches);

    let category_rows: Vec<(String, Amount)> = summary
        .charts
        .by_category
        .iter()
        .map(|s| (format!("{} ({})", s.category, s.color), s.amount))
        .collect();
    let branch_rows: Vec<(String, Amount)> = summary
        .charts
        .by_branch
        .iter()
        .map(|(b, a)| (b.to_string(), a))
        .collect();

    let _ = writeln!(out, "\nIngresos por categoría");
    out.push_str(&bars(&category_rows));
    let _ = writeln!(out, "\nIngresos por sede");
    out.push_str(&bars(&branch_rows));
    out.trim_end().to_string()
}

/// One line per entry, with a bar proportional to the largest amount.
fn bars(rows: &[(String, Amount)]) -> String {
    let max = rows.iter().map(|(_, a)| a.to_f64()).fold(0.0, f64::max);
    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for (label, amount) in rows {
        let len = if max > 0.0 {
            (amount.to_f64() / max * BAR_WIDTH).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "{label:<label_width$}  {:<width$}  {amount}",
            "#".repeat(len),
            width = BAR_WIDTH as usize
        );
    }
    out
}
