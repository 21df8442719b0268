// SPDX-License-Identifier: MIT OR Apache-2.0
//! Batch report printing and RON dumps.

use crate::error::CliResult;
use jsonport_graph::ExpressionGraph;
use jsonport_import::{BatchReport, ImportStatus, ImportedAsset};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Human readable summary of one batch
pub fn format_report(source: &Path, report: &BatchReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", source.display());

    for outcome in &report.outcomes {
        match &outcome.status {
            ImportStatus::Imported => {
                let saved = if outcome.saved { " (saved)" } else { "" };
                let _ = writeln!(out, "  ok    {} [{}]{saved}", outcome.name, outcome.type_name);
            }
            ImportStatus::Failed(reason) => {
                let _ = writeln!(out, "  FAIL  {} [{}]: {reason}", outcome.name, outcome.type_name);
            }
        }
    }

    for asset in &report.assets {
        if let Some(graph) = &asset.graph {
            let _ = writeln!(out, "  graph {}", graph_summary(graph));
        }
        for graph in &asset.subgraphs {
            let _ = writeln!(out, "  graph {}", graph_summary(graph));
        }
    }

    if !report.missing_types.is_empty() {
        let _ = writeln!(out, "  missing node types: {}", report.missing_types.join(", "));
    }
    for diagnostic in &report.diagnostics {
        let _ = writeln!(out, "  note  {diagnostic}");
    }

    let _ = writeln!(
        out,
        "  {} imported, {} failed, {} skipped",
        report.success_count(),
        report.failure_count(),
        report.skipped
    );
    out
}

fn graph_summary(graph: &ExpressionGraph) -> String {
    format!(
        "{}: {} expression(s), {} comment(s), {} connection(s)",
        graph.name,
        graph.expression_count(),
        graph.comment_count(),
        graph.connection_count()
    )
}

/// Write each imported asset and its graphs as RON files under `dir`.
/// Returns the written paths.
pub fn dump_assets(dir: &Path, assets: &[ImportedAsset]) -> CliResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for asset in assets {
        let stem = file_stem(&asset.object.name);
        let object_path = dir.join(format!("{stem}.ron"));
        std::fs::write(&object_path, asset.object.to_ron()?)?;
        written.push(object_path);

        for sub in &asset.subobjects {
            let path = dir.join(format!("{stem}.{}.ron", file_stem(&sub.name)));
            std::fs::write(&path, sub.to_ron()?)?;
            written.push(path);
        }

        for graph in asset.graph.iter().chain(&asset.subgraphs) {
            let path = dir.join(format!("{stem}.{}.graph.ron", file_stem(&graph.name)));
            std::fs::write(&path, graph.to_ron()?)?;
            written.push(path);
        }
    }

    tracing::info!("Dumped {} file(s) to {}", written.len(), dir.display());
    Ok(written)
}

/// Object and graph names may contain path separators (`Machine/State`)
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}
