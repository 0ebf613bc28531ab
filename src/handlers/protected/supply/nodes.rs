// handlers/protected/supply/nodes.rs - /supply/nodes/ CRUD handlers

use axum::extract::{Extension, Path, Query, State};
use serde_json::Value;

use crate::database::models::{NodeFilter, NodeId, NodeView};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::supply::{NodeDraft, WriteMode};

/// GET /supply/nodes/ - all nodes ordered by name, `?country=` for an exact match
pub async fn node_list(
    State(state): State<AppState>,
    Query(filter): Query<NodeFilter>,
) -> ApiResult<Vec<NodeView>> {
    let nodes = state.supply.list_nodes(&filter).await?;
    Ok(ApiResponse::success(nodes))
}

/**
 * POST /supply/nodes/create/ - Create a node
 *
 * Expected Input:
 * ```json
 * {
 *   "name": "Plant One",
 *   "email": "plant@example.com",
 *   "phone": "+70000000001",
 *   "country": "Russia",
 *   "city": "Moscow",
 *   "street": "Lenina",
 *   "building_number": "1A",
 *   "supplier": null,             // optional, id of another node
 *   "debt_to_supplier": "0.00"    // optional, only settable here
 * }
 * ```
 *
 * Responds 201 with the stored node and its computed `level`.
 */
pub async fn node_create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(draft): ApiJson<NodeDraft>,
) -> ApiResult<NodeView> {
    let node = state.supply.create_node(&auth_user.email, draft).await?;
    Ok(ApiResponse::created(node))
}

/// GET /supply/nodes/:id/
pub async fn node_get(State(state): State<AppState>, Path(id): Path<NodeId>) -> ApiResult<NodeView> {
    let node = state.supply.get_node(id).await?;
    Ok(ApiResponse::success(node))
}

/// PUT /supply/nodes/:id/update/ - full replacement. `debt_to_supplier` is
/// dropped from the body and audited, never applied.
pub async fn node_put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<NodeId>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<NodeView> {
    let node = state.supply.update_node(&auth_user.email, id, body, WriteMode::Full).await?;
    Ok(ApiResponse::success(node))
}

/// PATCH /supply/nodes/:id/update/ - partial update, same guard as PUT
pub async fn node_patch(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<NodeId>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<NodeView> {
    let node = state.supply.update_node(&auth_user.email, id, body, WriteMode::Partial).await?;
    Ok(ApiResponse::success(node))
}

/// DELETE /supply/nodes/:id/delete/ - clients lose their supplier, products go too
pub async fn node_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<NodeId>,
) -> ApiResult<()> {
    state.supply.delete_node(&auth_user.email, id).await?;
    Ok(ApiResponse::no_content())
}
