//! Embedding model CLI commands: list, show, use.
//!
//! The active model is persisted as `embedding.model` in `config.toml`.
//! Switching to a model of a different width leaves the table alone unless
//! the user asks for an immediate recreation; otherwise the next insert
//! reports the conflict.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use semnote_core::embedding::catalog::ModelCatalog;
use semnote_infra::config::set_active_model;
use semnote_types::embedding::{EmbeddingModelDescriptor, EmbeddingProviderKind};
use semnote_types::vector::ModelChangePlan;

use crate::state::AppState;

/// Model management subcommands.
#[derive(Subcommand)]
pub enum ModelCommand {
    /// List the models in the catalog.
    #[command(alias = "ls")]
    List {
        /// Only show models served by this provider (openai, ollama).
        #[arg(long, short)]
        provider: Option<EmbeddingProviderKind>,
    },

    /// Show the active model.
    Show,

    /// Switch the active model and save the choice to config.toml.
    Use {
        /// Catalog name of the model to activate.
        name: String,

        /// Skip confirmation prompts.
        #[arg(long, short)]
        yes: bool,

        /// Recreate the table right away if the new model does not fit it.
        #[arg(long)]
        recreate: bool,
    },
}

/// Handle a model management subcommand.
pub async fn handle_model_command(cmd: ModelCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        ModelCommand::List { provider } => list_models(state, provider, json).await,
        ModelCommand::Show => show_model(state, json).await,
        ModelCommand::Use {
            name,
            yes,
            recreate,
        } => use_model(state, &name, yes, recreate, json).await,
    }
}

async fn list_models(
    state: &AppState,
    provider: Option<EmbeddingProviderKind>,
    json: bool,
) -> Result<()> {
    let models = match provider {
        Some(provider) => state.catalog.list_for_provider(provider),
        None => state.catalog.list(),
    };
    let active = state.vector_service.active_model().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    println!("{}", models_table(&models, &active.name));
    Ok(())
}

fn models_table(models: &[&EmbeddingModelDescriptor], active: &str) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Provider").fg(Color::White),
        Cell::new("Dimensions").fg(Color::White),
        Cell::new("Description").fg(Color::White),
    ]);

    for model in models {
        let is_active = model.name == active;
        let name_cell = if is_active {
            Cell::new(&model.name).fg(Color::Green)
        } else {
            Cell::new(&model.name)
        };
        table.add_row(vec![
            Cell::new(if is_active { "*" } else { "" }),
            name_cell,
            Cell::new(model.provider),
            Cell::new(model.dimensions),
            Cell::new(&model.description),
        ]);
    }
    table
}

async fn show_model(state: &AppState, json: bool) -> Result<()> {
    let model = state.vector_service.active_model().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&model)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&model.name).bold());
    println!("  Provider:   {}", model.provider);
    println!("  Dimensions: {}", model.dimensions);
    if !model.description.is_empty() {
        println!("  {}", style(&model.description).dim());
    }
    println!();
    Ok(())
}

async fn use_model(
    state: &AppState,
    name: &str,
    yes: bool,
    recreate: bool,
    json: bool,
) -> Result<()> {
    let target = lookup(&state.catalog, name)?.clone();
    let service = &state.vector_service;
    let plan = service.plan_model_change(&target).await?;

    if plan.current.name == target.name {
        if json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            println!(
                "  {} {} is already the active model.",
                style("i").blue().bold(),
                style(&target.name).bold()
            );
        }
        return Ok(());
    }

    let interactive = !yes && !json;
    if interactive {
        println!();
        for line in describe_plan(&plan) {
            println!("  {line}");
        }
        println!();
        let confirmed = Confirm::new()
            .with_prompt(format!("Switch to '{}'?", target.name))
            .default(true)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    // Build before persisting so a bad provider config never becomes the default.
    let model = state.build_model(&target.name)?;

    // Only the file's own contents are written back, so environment API keys
    // never land on disk. A config.toml that fails to parse is left alone.
    set_active_model(&state.data_dir, &target.name)
        .await
        .context("model not switched; fix config.toml first")?;
    let report = service.change_model(model).await?;

    let mut recreated = false;
    if plan.requires_recreate {
        let do_recreate = if recreate {
            true
        } else if interactive {
            Confirm::new()
                .with_prompt(format!(
                    "Recreate the table now? All {} indexed notes will be deleted.",
                    style(plan.existing_records).red().bold()
                ))
                .default(false)
                .interact()?
        } else {
            false
        };
        if do_recreate {
            service.recreate_table().await?;
            recreated = true;
        }
    }

    if json {
        let out = serde_json::json!({
            "status": "switched",
            "plan": plan,
            "report": report,
            "recreated": recreated,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "  {} Active model is now {} ({} dimensions)",
        style("✓").green().bold(),
        style(&target.name).bold(),
        target.dimensions
    );
    if recreated {
        println!("  {} Table recreated", style("✓").green().bold());
    } else if plan.requires_recreate {
        println!(
            "  {} The table still holds {}-dimensional vectors. The next {} will ask to recreate it.",
            style("!").yellow().bold(),
            plan.table_dimensions
                .map_or_else(|| "?".to_string(), |d| d.to_string()),
            style("semnote index").cyan()
        );
    }
    Ok(())
}

fn lookup<'a>(catalog: &'a ModelCatalog, name: &str) -> Result<&'a EmbeddingModelDescriptor> {
    match catalog.get_info(name) {
        Some(descriptor) => Ok(descriptor),
        None => {
            let known: Vec<_> = catalog.list().iter().map(|d| d.name.as_str()).collect();
            bail!("unknown model '{name}' (known: {})", known.join(", "))
        }
    }
}

/// Human-readable summary of a model change.
fn describe_plan(plan: &ModelChangePlan) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({}d) -> {} ({}d)",
        plan.current.name, plan.old_dimensions, plan.target.name, plan.new_dimensions
    )];
    if plan.requires_recreate {
        lines.push(format!(
            "The table ({}d, {} notes) does not fit the new model and must be recreated before indexing.",
            plan.table_dimensions
                .map_or_else(|| "?".to_string(), |d| d.to_string()),
            plan.existing_records
        ));
    } else if !plan.dimensions_changed {
        lines.push("Same width: existing notes stay searchable.".to_string());
    } else if plan.table_dimensions.is_some() {
        lines.push("Width changes, and the table already matches the new model.".to_string());
    } else {
        lines.push("Width changes, but no table exists yet.".to_string());
    }
    lines
}
