//! `semnote index`: embed text and add it to the vector table.

use std::path::Path;

use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::Confirm;

use semnote_types::vector::{CompatibilityReport, InsertOutcome};

use crate::state::AppState;

/// Read the note body from the positional argument or `--file`.
pub async fn read_input(text: Option<String>, file: Option<&Path>) -> Result<String> {
    let content = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => bail!("nothing to index: pass TEXT or --file"),
    };
    if content.trim().is_empty() {
        bail!("nothing to index: the input is empty");
    }
    Ok(content)
}

/// Index `content`, asking before a destructive recreation unless `yes`.
pub async fn index(state: &AppState, content: &str, yes: bool, json: bool) -> Result<()> {
    let service = &state.vector_service;

    let id = match service.insert_content(content).await? {
        InsertOutcome::Inserted { id } => id,
        InsertOutcome::RequiresConfirmation(report) => {
            if !confirm_recreate(state, &report, yes, json).await? {
                if json {
                    let out = serde_json::json!({
                        "status": "cancelled",
                        "compatibility": report,
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                } else {
                    println!("  Cancelled. The table was left untouched.");
                }
                return Ok(());
            }
            service.insert_content_confirmed(content).await?
        }
    };

    if json {
        let out = serde_json::json!({
            "status": "inserted",
            "id": id,
            "model": state.vector_service.active_model().await.name,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "  {} Indexed note {} ({} chars)",
            style("✓").green().bold(),
            style(id).bold(),
            content.chars().count()
        );
    }
    Ok(())
}

async fn confirm_recreate(
    state: &AppState,
    report: &CompatibilityReport,
    yes: bool,
    json: bool,
) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    // Prompts would corrupt machine-readable output.
    if json {
        return Ok(false);
    }

    let existing = state.vector_service.count().await?;
    println!();
    println!(
        "  {} The table holds {}-dimensional vectors but the active model produces {}.",
        style("!").yellow().bold(),
        report
            .table_dimensions
            .map_or_else(|| "?".to_string(), |d| d.to_string()),
        report.model_dimensions
    );
    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Recreate the table? All {} indexed notes will be deleted.",
            style(existing).red().bold()
        ))
        .default(false)
        .interact()?;
    Ok(confirmed)
}
