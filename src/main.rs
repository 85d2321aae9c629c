//! Bidscope demo entrypoint: evaluate one local opportunity folder.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use bidscope::clients::{ClientError, DocumentIngestor, IngestedDocuments};
use bidscope::config::Config;
use bidscope::engine::{Collaborators, EvaluationEngine, StartOutcome, TaskStatus};
use bidscope::profile::CompanyProfile;

/// Reads `.txt` and `.md` files from the opportunity folder, in name order.
struct PlainTextIngestor;

#[async_trait]
impl DocumentIngestor for PlainTextIngestor {
    async fn ingest(&self, folder: &Path) -> Result<IngestedDocuments, ClientError> {
        let mut names: Vec<PathBuf> = std::fs::read_dir(folder)
            .map_err(|source| ClientError::Io {
                path: folder.to_path_buf(),
                source,
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("txt") | Some("md")
                )
            })
            .collect();
        names.sort();

        let mut documents = IngestedDocuments::default();
        let mut parts = Vec::with_capacity(names.len());
        for path in names {
            let text = std::fs::read_to_string(&path).map_err(|source| ClientError::Io {
                path: path.clone(),
                source,
            })?;
            parts.push(text);
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                documents.files.push(name.to_string());
            }
        }
        documents.combined_text = parts.join("\n\n");
        Ok(documents)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!(
        r#"
██████╗ ██╗██████╗ ███████╗ ██████╗ ██████╗ ██████╗ ███████╗
██╔══██╗██║██╔══██╗██╔════╝██╔════╝██╔═══██╗██╔══██╗██╔════╝
██████╔╝██║██║  ██║███████╗██║     ██║   ██║██████╔╝█████╗
██╔══██╗██║██║  ██║╚════██║██║     ██║   ██║██╔═══╝ ██╔══╝
██████╔╝██║██████╔╝███████║╚██████╗╚██████╔╝██║     ███████╗
╚═════╝ ╚═╝╚═════╝ ╚══════╝ ╚═════╝ ╚═════╝ ╚═╝     ╚══════╝

        EVALUATE. GOVERN. BID.
                                        AGPL-3.0
"#
    );

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(opportunity_id), Some(folder)) = (args.next(), args.next()) else {
        eprintln!("usage: bidscope <opportunity-id> <document-folder> [title]");
        std::process::exit(2);
    };
    let title = args.next().unwrap_or_else(|| opportunity_id.clone());

    let config = Config::from_env()?;
    config.validate()?;

    let profile = CompanyProfile::load_or_default(config.profile_path.as_deref());
    tracing::info!(
        company = %profile.company_name,
        budget_limit = config.monthly_budget_limit,
        "Bidscope starting"
    );

    let engine = EvaluationEngine::new(
        config,
        profile,
        Collaborators {
            ingestor: std::sync::Arc::new(PlainTextIngestor),
            ai: None,
            search: None,
            renderer: None,
        },
    );

    match engine.start_evaluation(&opportunity_id, &title, PathBuf::from(folder)) {
        StartOutcome::Accepted => {}
        StartOutcome::Conflict => anyhow::bail!("evaluation already in flight"),
    }

    loop {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let Some(view) = engine.status(&opportunity_id) else {
            anyhow::bail!("task record vanished");
        };
        match view.status {
            TaskStatus::Queued | TaskStatus::Processing => {
                tracing::debug!(progress = view.progress, step = %view.step, "working");
            }
            TaskStatus::Completed => break,
            TaskStatus::Error => {
                anyhow::bail!(
                    "evaluation failed: {}",
                    view.error.unwrap_or_else(|| "unknown error".to_string())
                );
            }
        }
    }

    let report = engine
        .result(&opportunity_id)
        .ok_or_else(|| anyhow::anyhow!("completed task has no report"))?;
    println!("{}", serde_json::to_string_pretty(report.as_ref())?);

    let summary = engine.governor().monthly_summary(None);
    tracing::info!(
        month = %summary.month,
        spend = summary.total_cost,
        "monthly spend after this evaluation"
    );

    Ok(())
}
