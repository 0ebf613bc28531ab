use std::collections::HashMap;

use anyhow::{anyhow, Context};
use clap::Subcommand;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::cli::utils::{output_skipped, output_success};
use crate::cli::OutputFormat;
use crate::database::models::{NodeFilter, NodeId};
use crate::state::AppState;
use crate::supply::{NodeDraft, ProductDraft};

const NODES_JSON: &str = include_str!("../../../fixtures/nodes.json");
const PRODUCTS_JSON: &str = include_str!("../../../fixtures/products.json");

/// Actor recorded in the audit log for fixture writes.
const ACTOR: &str = "supplyctl";

#[derive(Subcommand)]
pub enum FixtureCommands {
    #[command(about = "Load nodes and products; each table is skipped when it already has rows")]
    Load,
}

/// Fixture node. `supplier` refers to another fixture node by name and must
/// appear earlier in the file.
#[derive(Debug, Deserialize)]
struct FixtureNode {
    name: String,
    email: String,
    phone: String,
    country: String,
    city: String,
    street: String,
    building_number: String,
    supplier: Option<String>,
    #[serde(default)]
    debt_to_supplier: Decimal,
}

#[derive(Debug, Deserialize)]
struct FixtureProduct {
    name: String,
    model: String,
    release_date: String,
    owner: String,
}

/// Rows inserted per table; `None` when the table was already populated.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FixtureReport {
    pub nodes: Option<usize>,
    pub products: Option<usize>,
}

pub async fn handle(cmd: FixtureCommands, state: &AppState, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        FixtureCommands::Load => {
            let report = load(state).await?;
            match report.nodes {
                Some(n) => output_success(output_format, &format!("Loaded {} nodes", n), Some(json!({ "nodes": n })))?,
                None => output_skipped(output_format, "Node fixture already loaded")?,
            }
            match report.products {
                Some(n) => {
                    output_success(output_format, &format!("Loaded {} products", n), Some(json!({ "products": n })))?
                }
                None => output_skipped(output_format, "Product fixture already loaded")?,
            }
            Ok(())
        }
    }
}

/// Loads the bundled fixtures through the same validation as the API.
pub async fn load(state: &AppState) -> anyhow::Result<FixtureReport> {
    let (node_count, _) = state.supply.counts().await?;
    let nodes = if node_count == 0 {
        Some(load_nodes(state).await?)
    } else {
        None
    };

    // counted again: loading nodes does not add products
    let (_, product_count) = state.supply.counts().await?;
    let products = if product_count == 0 {
        Some(load_products(state).await?)
    } else {
        None
    };

    Ok(FixtureReport { nodes, products })
}

async fn load_nodes(state: &AppState) -> anyhow::Result<usize> {
    let fixtures: Vec<FixtureNode> = serde_json::from_str(NODES_JSON).context("malformed nodes fixture")?;
    let mut ids: HashMap<String, NodeId> = HashMap::new();

    for fixture in fixtures {
        let supplier = match &fixture.supplier {
            Some(name) => Some(
                *ids.get(name)
                    .ok_or_else(|| anyhow!("node '{}' references unknown supplier '{}'", fixture.name, name))?,
            ),
            None => None,
        };

        let draft = NodeDraft {
            name: Some(fixture.name.clone()),
            email: Some(fixture.email),
            phone: Some(fixture.phone),
            country: Some(fixture.country),
            city: Some(fixture.city),
            street: Some(fixture.street),
            building_number: Some(fixture.building_number),
            supplier,
            debt_to_supplier: Some(fixture.debt_to_supplier),
        };
        let view = state
            .supply
            .create_node(ACTOR, draft)
            .await
            .map_err(|e| anyhow!("node '{}': {:?}", fixture.name, e))?;
        ids.insert(fixture.name, view.node.id);
    }

    Ok(ids.len())
}

async fn load_products(state: &AppState) -> anyhow::Result<usize> {
    let fixtures: Vec<FixtureProduct> = serde_json::from_str(PRODUCTS_JSON).context("malformed products fixture")?;
    let ids: HashMap<String, NodeId> = state
        .supply
        .list_nodes(&NodeFilter::default())
        .await?
        .into_iter()
        .map(|view| (view.node.name, view.node.id))
        .collect();

    let mut loaded = 0;
    for fixture in fixtures {
        let Some(owner) = ids.get(&fixture.owner).copied() else {
            tracing::warn!("Skipping product '{}': owner '{}' does not exist", fixture.name, fixture.owner);
            continue;
        };
        let draft = ProductDraft {
            name: Some(fixture.name.clone()),
            model: Some(fixture.model),
            release_date: Some(fixture.release_date),
            owner: Some(owner),
        };
        state
            .supply
            .create_product(ACTOR, draft)
            .await
            .map_err(|e| anyhow!("product '{}': {:?}", fixture.name, e))?;
        loaded += 1;
    }

    Ok(loaded)
}
