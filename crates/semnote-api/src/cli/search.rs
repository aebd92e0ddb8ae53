//! `semnote search`: rank indexed notes by similarity to a query.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use semnote_types::error::VectorServiceError;
use semnote_types::vector::SimilarityResult;

use crate::state::AppState;

const PREVIEW_CHARS: usize = 80;

pub async fn search(state: &AppState, query: &str, limit: Option<usize>, json: bool) -> Result<()> {
    let results = match state.vector_service.search_similar(query, limit).await {
        Ok(results) => results,
        Err(VectorServiceError::NoTable) => {
            if json {
                println!("[]");
            } else {
                println!();
                println!(
                    "  {} Nothing indexed yet. Index something first with {}.",
                    style("i").blue().bold(),
                    style("semnote index").cyan()
                );
                println!();
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!();
        println!("  {} No matches.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    println!("{}", results_table(&results));
    Ok(())
}

fn results_table(results: &[SimilarityResult]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Similarity").fg(Color::White),
        Cell::new("Distance").fg(Color::White),
        Cell::new("Id").fg(Color::White),
        Cell::new("Content").fg(Color::White),
    ]);

    for (rank, result) in results.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(format!("{:.3}", result.similarity)).fg(similarity_color(result.similarity)),
            Cell::new(format!("{:.4}", result.distance)),
            Cell::new(result.id),
            Cell::new(preview(&result.content, PREVIEW_CHARS)),
        ]);
    }
    table
}

fn similarity_color(similarity: f32) -> Color {
    if similarity >= 0.75 {
        Color::Green
    } else if similarity >= 0.5 {
        Color::Yellow
    } else {
        Color::DarkGrey
    }
}

/// First line of `content`, cut to `max` characters.
pub fn preview(content: &str, max: usize) -> String {
    let line = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if line.chars().count() > max {
        let cut: String = line.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        line.to_string()
    }
}
