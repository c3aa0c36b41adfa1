use anyhow::Context;
use mimalloc::MiMalloc;
use misra_report::config::AppConfig;
use misra_report::errors::{self, AppError};
use misra_report::models::report::ReportMetadata;
use misra_report::services::pipeline::{self, ReportInputs, ReportOutputs};
use misra_report::services::publish::{self, CommentTarget, GithubClient};
use misra_report::services::storage::ConfiguredStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// M-MIMALLOC-APP: Use mimalloc as global allocator for improved performance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "misra_report=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    if let Err(e) = run().await {
        tracing::error!(
            error = %format!("{e:#}"),
            stage = errors::failure_stage(&e),
            "MISRA C report failed"
        );
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let metadata = ReportMetadata {
        project: config.project.clone(),
        commit: config.commit.clone(),
        date: chrono::Utc::now().format("%Y-%m-%d").to_string(),
        guidelines: config.guidelines.clone(),
        checking_tool: config.checking_tool.clone(),
        download_url: None,
        repository: config.repository.clone(),
        server_url: config.server_url.clone(),
        workspace: config.workspace.clone(),
    };
    let inputs = ReportInputs {
        results_file: config.results_file.clone(),
        rules_file: config.rules_file.clone(),
        suppressions_file: config.suppressions_file.clone(),
        files_manifest: config.files_manifest.clone(),
        deviations_file: config.deviations_file.clone(),
    };
    tracing::info!(project = %metadata.project, commit = %metadata.commit, "Generating MISRA C report");

    let store = config.artifact_target.as_ref().map(ConfiguredStore::from_target);
    let outputs = ReportOutputs {
        pdf: config.pdf_output.clone(),
        document: config.document_output.clone(),
        comment: config.comment_output.clone(),
    };
    let artifacts =
        pipeline::generate_report(&inputs, &metadata, &outputs, store.as_ref()).await?;

    tracing::info!(
        result = %artifacts.analysis.reconciliation.overall(),
        orphans = artifacts.analysis.reconciliation.orphans,
        download_url = artifacts.download_url.as_deref().unwrap_or(""),
        "Report generated"
    );

    if !config.publish_comment {
        return Ok(());
    }

    let token = config
        .github_token
        .as_deref()
        .ok_or_else(|| AppError::Config("GITHUB_TOKEN must be set to publish".to_string()))?;
    let target = config
        .pull_request
        .map(CommentTarget::PullRequest)
        .or_else(|| CommentTarget::from_ref(&config.git_ref))
        .ok_or_else(|| AppError::NoPullRequest(config.git_ref.clone()))?;

    let client = GithubClient::new(&config.api_url, token, &config.repository)?;
    let outcome = publish::upsert_report_comment(&client, &target, &artifacts.comment).await?;
    tracing::info!(?outcome, "Published report comment");

    Ok(())
}
