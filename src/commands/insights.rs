use crate::commands::{open_store, Out};
use crate::insight::{self, Insight};
use crate::{Config, Mode, Result};
use std::fmt::Write;

const UNAVAILABLE: &str = "Unable to generate insights right now, please try again later";

/// Asks the insight service about every transaction.
///
/// A failed request is not an error: the command reports a generic notice and the reason is
/// logged as a warning.
pub async fn insights(config: Config, mode: Mode) -> Result<Out<Option<Insight>>> {
    let store = open_store(&config).await?;
    let service = insight::service(mode, config.insight());
    let result = insight::request_insight(service.as_ref(), store.snapshot()).await;
    Ok(match result {
        Some(insight) => {
            let report = render(&insight);
            Out::new("Insights generated", Some(insight)).with_report(report)
        }
        None => Out::new(UNAVAILABLE, None),
    })
}

fn render(insight: &Insight) -> String {
    let mut out = format!("{}\n\nTendencia: {}\n", insight.summary, insight.trend);
    for (i, r) in insight.recommendations.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = write!(out, "\n{}. {r}", i + 1);
    }
    out
}
