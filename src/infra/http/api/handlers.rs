use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::catalog::CatalogError;
use crate::application::repos::RepoError;
use crate::infra::http::db_health_response;

use super::error::{ApiError, codes};
use super::state::ApiState;

pub async fn list_products(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .catalog
        .list_products()
        .await
        .map_err(catalog_to_api)?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_product_id(&id)?;
    let product = state.catalog.product(id).await.map_err(catalog_to_api)?;
    Ok(Json(product))
}

pub async fn like_product(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_product_id(&id)?;
    state
        .catalog
        .like_product(id)
        .await
        .map_err(catalog_to_api)?;
    Ok(StatusCode::OK)
}

pub async fn db_health(State(state): State<ApiState>) -> Response {
    db_health_response(state.db.health_check().await)
}

/// Ids arrive as raw path segments; anything that is not a signed 64-bit
/// integer is a 400, never a 404.
fn parse_product_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| {
        ApiError::bad_request(
            "invalid product id",
            Some(format!("{raw:?} is not an integer id")),
        )
    })
}

fn catalog_to_api(err: CatalogError) -> ApiError {
    match err {
        CatalogError::NotFound => ApiError::not_found("product not found"),
        CatalogError::Repo(RepoError::Timeout) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        CatalogError::Repo(RepoError::Cache(err)) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::CACHE,
            "Cache error",
            Some(err.to_string()),
        ),
        CatalogError::Repo(err) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(err.to_string()),
        ),
    }
}
