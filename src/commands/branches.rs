use crate::commands::{require_session, Out};
use crate::{Config, Result};

/// Lists the branches from `config.json`.
pub async fn branches(config: Config) -> Result<Out<Vec<String>>> {
    require_session(&config).await?;
    let branches = config.branches().to_vec();
    let report = branches.join("\n");
    Ok(Out::new(format!("{} known branches", branches.len()), branches).with_report(report))
}
