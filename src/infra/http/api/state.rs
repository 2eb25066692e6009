use std::sync::Arc;

use crate::application::catalog::CatalogService;
use crate::infra::db::PostgresProducts;

#[derive(Clone)]
pub struct ApiState {
    pub catalog: Arc<CatalogService>,
    pub db: Arc<PostgresProducts>,
}
