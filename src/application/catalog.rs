use std::sync::Arc;

use thiserror::Error;

use crate::application::repos::{ProductsRepo, RepoError};
use crate::domain::entities::ProductRecord;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product not found")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Thin business-rule layer over the product repository. Its one rule:
/// an absent product becomes an explicit not-found failure; everything
/// else passes through unchanged.
#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductsRepo>,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductsRepo>) -> Self {
        Self { products }
    }

    pub async fn list_products(&self) -> Result<Vec<ProductRecord>, CatalogError> {
        Ok(self.products.list_products().await?)
    }

    pub async fn product(&self, id: i64) -> Result<ProductRecord, CatalogError> {
        match self.products.find_product(id).await? {
            Some(product) => Ok(product),
            None => Err(CatalogError::NotFound),
        }
    }

    pub async fn like_product(&self, id: i64) -> Result<(), CatalogError> {
        self.products.like_product(id).await.map_err(|err| match err {
            RepoError::NotFound => CatalogError::NotFound,
            other => CatalogError::Repo(other),
        })
    }
}
