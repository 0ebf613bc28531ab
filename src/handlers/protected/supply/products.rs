// handlers/protected/supply/products.rs - /supply/products/ CRUD handlers

use axum::extract::{Extension, Path, Query, State};

use crate::database::models::{Product, ProductFilter, ProductId};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::supply::{ProductChanges, ProductDraft, WriteMode};

/// GET /supply/products/ - ordered by name, `?owner=<node id>` to filter
pub async fn product_list(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> ApiResult<Vec<Product>> {
    let products = state.supply.list_products(&filter).await?;
    Ok(ApiResponse::success(products))
}

/**
 * POST /supply/products/create/ - Create a product
 *
 * Expected Input:
 * ```json
 * { "name": "Smartphone", "model": "X100", "release_date": "2024-03-01", "owner": 1 }
 * ```
 */
pub async fn product_create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(draft): ApiJson<ProductDraft>,
) -> ApiResult<Product> {
    let product = state.supply.create_product(&auth_user.email, draft).await?;
    Ok(ApiResponse::created(product))
}

/// GET /supply/products/:id/
pub async fn product_get(State(state): State<AppState>, Path(id): Path<ProductId>) -> ApiResult<Product> {
    let product = state.supply.get_product(id).await?;
    Ok(ApiResponse::success(product))
}

/// PUT /supply/products/:id/update/
pub async fn product_put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<ProductId>,
    ApiJson(changes): ApiJson<ProductChanges>,
) -> ApiResult<Product> {
    let product = state
        .supply
        .update_product(&auth_user.email, id, changes, WriteMode::Full)
        .await?;
    Ok(ApiResponse::success(product))
}

/// PATCH /supply/products/:id/update/
pub async fn product_patch(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<ProductId>,
    ApiJson(changes): ApiJson<ProductChanges>,
) -> ApiResult<Product> {
    let product = state
        .supply
        .update_product(&auth_user.email, id, changes, WriteMode::Partial)
        .await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /supply/products/:id/delete/
pub async fn product_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<ProductId>,
) -> ApiResult<()> {
    state.supply.delete_product(&auth_user.email, id).await?;
    Ok(ApiResponse::no_content())
}
