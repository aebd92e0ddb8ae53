//! `semnote status`: active model, table state and compatibility.

use anyhow::Result;
use console::style;

use semnote_core::vector::store::VectorStore;

use crate::state::AppState;

pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let service = &state.vector_service;
    let model = service.active_model().await;
    let table = service.store().check_table_exists().await;
    let report = service.check_compatibility().await;
    let records = if table.exists { service.count().await? } else { 0 };

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "database": state.database.display().to_string(),
            "model": model,
            "table": {
                "name": service.store().table_name(),
                "exists": table.exists,
                "dimensions": table.dimensions,
                "records": records,
            },
            "compatibility": report,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!("  {} semnote v{}", style("◆").bold(), env!("CARGO_PKG_VERSION"));
    println!();

    println!("  {}", style("── Model ──").dim());
    println!("  Name:       {}", style(&model.name).bold());
    println!("  Provider:   {}", model.provider);
    println!("  Dimensions: {}", model.dimensions);
    println!();

    println!("  {}", style("── Table ──").dim());
    println!("  Name:       {}", service.store().table_name());
    if table.exists {
        println!(
            "  Dimensions: {}",
            table
                .dimensions
                .map_or_else(|| "unknown".to_string(), |d| d.to_string())
        );
        println!("  Records:    {}", style(records).bold());
    } else {
        println!("  {}", style("not created yet").dim());
    }
    if report.compatible {
        println!("  Fits model: {}", style("yes").green());
    } else {
        println!(
            "  Fits model: {} (run {} or {})",
            style("no").red().bold(),
            style("semnote recreate").cyan(),
            style("semnote index --yes").cyan()
        );
    }
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Data dir:   {}", style(state.data_dir.display()).dim());
    println!("  Database:   {}", style(state.database.display()).dim());
    println!();

    Ok(())
}
