//! Sync, diff and validate command handlers

use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::Path;
use std::time::Instant;

use super::{DiffArgs, SyncArgs, ValidateArgs};
use crate::api::{AirtableClient, SchemaDefinition};
use crate::cli::GlobalArgs;
use crate::config::{Config, ConfigLayer};
use crate::services::reconcile::{
    ChangeKind, RunContext, SchemaDelta, SchemaReconciler, SyncError, SyncReport,
    export_report_to_json,
};

/// Read and parse a schema definition file
pub fn load_schema_file(path: &Path) -> Result<SchemaDefinition> {
    if !path.exists() {
        anyhow::bail!("Schema file does not exist: {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
    if content.trim().is_empty() {
        anyhow::bail!("Schema file is empty: {}", path.display());
    }

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse schema file: {}", path.display()))
}

fn load_config(global: &GlobalArgs) -> Result<Config> {
    let flags = ConfigLayer {
        api_key: global.api_key.clone(),
        ..Default::default()
    };
    Config::load(flags, global.config.as_deref())
}

/// Handle `basesync sync`
pub async fn handle_sync_command(global: &GlobalArgs, args: SyncArgs) -> Result<()> {
    let mut schema = load_schema_file(&args.schema_file)?;
    let config = load_config(global)?;

    if schema.workspace_id.is_none() {
        schema.workspace_id = config.workspace_id.clone();
    }

    let client = AirtableClient::new(config.api_key.clone(), config.client.clone())?;
    let mut reconciler = SchemaReconciler::new(&client, RunContext::new());

    match args.base.as_deref() {
        Some(base_id) if !args.create_new => {
            println!("Updating base {}", base_id.cyan());
        }
        _ => println!("Creating a new base from {}", args.schema_file.display().to_string().cyan()),
    }

    let start = Instant::now();
    let result = match reconciler
        .reconcile(&schema, args.base.as_deref(), args.create_new)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            print_failure(&e);
            return Err(anyhow::Error::new(e).context("Schema synchronization failed"));
        }
    };
    let stats = client.pacer_stats();
    log::debug!(
        "Paced {} requests, {} delayed",
        stats.requests_paced,
        stats.requests_delayed
    );

    if let Some(delta) = &result.delta {
        println!(
            "Planned {} change(s): {} table(s) to create, {} field(s) to add",
            delta.total_changes(),
            delta.tables_to_create.len(),
            delta.fields_to_add()
        );
    }

    let report = result
        .report()
        .with_metrics(reconciler.context().metrics.clone());

    println!();
    print_report(&report);
    println!();
    println!(
        "Finished in {:.2}s",
        start.elapsed().as_secs_f64()
    );

    if let Some(path) = &args.report {
        export_report_to_json(&report, path)?;
        println!("Report saved to: {}", path.display().to_string().bright_green());
    }

    if result.is_complete() {
        println!("{} Base {} is in sync", "✓".bright_green(), result.base_id.bold());
    } else {
        println!(
            "{} {} field(s) could not be added to base {}",
            "!".yellow().bold(),
            result.failures.len(),
            result.base_id.bold()
        );
    }
    Ok(())
}

/// Handle `basesync diff`
pub async fn handle_diff_command(global: &GlobalArgs, args: DiffArgs) -> Result<()> {
    let schema = load_schema_file(&args.schema_file)?;
    let config = load_config(global)?;

    let client = AirtableClient::new(config.api_key.clone(), config.client.clone())?;
    let mut reconciler = SchemaReconciler::new(&client, RunContext::new());

    let delta = match reconciler.plan(&schema, &args.base).await {
        Ok(delta) => delta,
        Err(e) => {
            print_failure(&e);
            return Err(anyhow::Error::new(e).context("Failed to compare schemas"));
        }
    };

    print_delta(&args.base, &delta);
    Ok(())
}

/// Handle `basesync validate`
pub fn handle_validate_command(args: ValidateArgs) -> Result<()> {
    let schema = load_schema_file(&args.schema_file)?;

    if let Err(problems) = schema.validate() {
        println!("{} {}", "✗".bright_red(), args.schema_file.display());
        for problem in &problems {
            println!("  - {}", problem.red());
        }
        anyhow::bail!("Schema file has {} problem(s)", problems.len());
    }

    println!(
        "{} {} ({} tables, {} fields)",
        "✓".bright_green(),
        args.schema_file.display(),
        schema.tables.len(),
        schema.field_count()
    );
    for problem in schema.tables.iter().filter_map(|t| t.creation_problem()) {
        println!(
            "  {} {} (fine for an existing table, but it cannot be created)",
            "!".yellow(),
            problem
        );
    }
    Ok(())
}

fn print_report(report: &SyncReport) {
    let text = report.render(|kind, heading| match kind {
        Some(ChangeKind::BaseCreated) => heading.bright_magenta().bold().to_string(),
        Some(ChangeKind::TableCreated) => heading.bright_blue().bold().to_string(),
        Some(ChangeKind::FieldAdded) => heading.bright_green().bold().to_string(),
        None => heading.bright_red().bold().to_string(),
    });
    println!("{}", text);
    if let Some(metrics) = &report.metrics {
        println!("{}", metrics.summary_line().dimmed());
    }
}

/// Advice for store failures the user can act on
fn failure_hint(err: &SyncError) -> Option<&'static str> {
    let source = err.store_error()?;
    if source.is_auth_failure() {
        Some("Check that the API key is valid and has the schema.bases:write scope for this base")
    } else if source.is_rate_limited() {
        Some("Airtable is rate limiting this key; wait 30 seconds or lower requests_per_second")
    } else {
        None
    }
}

fn print_failure(err: &SyncError) {
    if let Some(hint) = failure_hint(err) {
        println!("{} {}", "hint:".yellow().bold(), hint);
    }
    let applied = err.applied();
    if !applied.is_empty() {
        println!("Applied before the failure:");
        for change in applied {
            println!("  {} {}", "+".bright_green(), change.summary());
        }
    }
}

fn print_delta(base_id: &str, delta: &SchemaDelta) {
    if !delta.has_changes() {
        println!("{} Base {} is already up to date", "✓".bright_green(), base_id.bold());
        return;
    }

    println!(
        "Base {}: {} change(s), {} table(s) to create, {} field(s) to add",
        base_id.bold(),
        delta.total_changes(),
        delta.tables_to_create.len(),
        delta.fields_to_add()
    );

    for table in &delta.tables_to_create {
        println!(
            "{} {} ({} fields)",
            "+".bright_green(),
            table.name.bright_green().bold(),
            table.fields.len()
        );
    }

    for update in &delta.tables_to_update {
        println!("{} {}", "~".yellow(), update.table_name.yellow().bold());
        for field in &update.fields {
            println!(
                "    {} {} {}",
                "+".bright_green(),
                field.name,
                format!("({})", field.field_type).dimmed()
            );
        }
    }
}
