//! `semnote recreate`: destructive table reset.

use anyhow::Result;
use console::style;
use dialoguer::Confirm;

use crate::state::AppState;

/// Drop all indexed notes and recreate the table for the active model.
pub async fn recreate(state: &AppState, yes: bool, json: bool) -> Result<()> {
    let service = &state.vector_service;
    let model = service.active_model().await;

    if !yes && !json {
        let existing = service.count().await?;
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete all {} indexed notes and recreate the table for '{}' ({} dims)?",
                style(existing).red().bold(),
                style(&model.name).bold(),
                model.dimensions
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    service.recreate_table().await?;

    if json {
        let out = serde_json::json!({
            "status": "recreated",
            "model": model.name,
            "dimensions": model.dimensions,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "  {} Recreated table for {} ({} dimensions)",
            style("✓").green().bold(),
            style(&model.name).bold(),
            model.dimensions
        );
    }
    Ok(())
}
