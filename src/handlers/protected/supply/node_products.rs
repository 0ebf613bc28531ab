// handlers/protected/supply/node_products.rs - products nested under a node

use axum::extract::{Path, State};

use crate::database::models::{NodeId, Product, ProductId};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /supply/nodes/:id/products/ - NODE_NOT_FOUND when the node is missing
pub async fn node_product_list(
    State(state): State<AppState>,
    Path(node_id): Path<NodeId>,
) -> ApiResult<Vec<Product>> {
    let products = state.supply.node_products(node_id).await?;
    Ok(ApiResponse::success(products))
}

/// GET /supply/nodes/:id/products/:product_id/
///
/// The node is looked up first: a missing node is NODE_NOT_FOUND, a product
/// that is missing or owned by another node is PRODUCT_NOT_FOUND.
pub async fn node_product_get(
    State(state): State<AppState>,
    Path((node_id, product_id)): Path<(NodeId, ProductId)>,
) -> ApiResult<Product> {
    let product = state.supply.node_product(node_id, product_id).await?;
    Ok(ApiResponse::success(product))
}
