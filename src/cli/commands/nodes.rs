use anyhow::anyhow;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::models::NodeId;
use crate::state::AppState;

#[derive(Subcommand)]
pub enum NodesCommands {
    #[command(about = "Set the debt to supplier of the given nodes to 0.00")]
    ClearDebt {
        #[arg(required = true, help = "Node ids")]
        ids: Vec<NodeId>,
    },

    #[command(about = "Print the supplier hierarchy with node levels")]
    Tree,
}

pub async fn handle(cmd: NodesCommands, state: &AppState, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        NodesCommands::ClearDebt { ids } => {
            let cleared = state
                .supply
                .clear_debt("supplyctl", &ids)
                .await
                .map_err(|e| anyhow!("clearing debt failed: {:?}", e))?;
            output_success(
                output_format,
                &format!("Cleared debt of {} nodes", cleared),
                Some(json!({ "cleared": cleared })),
            )
        }
        NodesCommands::Tree => {
            let entries = state
                .supply
                .tree()
                .await
                .map_err(|e| anyhow!("reading the hierarchy failed: {:?}", e))?;

            match output_format {
                OutputFormat::Json => {
                    let nodes: Vec<_> = entries
                        .iter()
                        .map(|e| {
                            json!({
                                "id": e.node.id,
                                "name": e.node.name,
                                "level": e.level,
                                "supplier": e.node.supplier_id,
                                "debt_to_supplier": e.node.debt_to_supplier
                            })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&json!({ "nodes": nodes }))?);
                }
                OutputFormat::Text => {
                    if entries.is_empty() {
                        println!("No nodes");
                    }
                    for entry in &entries {
                        println!(
                            "{}{} (#{}) level {} debt {}",
                            "  ".repeat(entry.level as usize),
                            entry.node.name,
                            entry.node.id,
                            entry.level,
                            entry.node.debt_to_supplier
                        );
                    }
                }
            }
            Ok(())
        }
    }
}
