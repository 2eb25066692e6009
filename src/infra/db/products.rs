use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::application::repos::{ProductStore, RepoError};
use crate::domain::entities::ProductRecord;

use super::PostgresProducts;
use super::util::map_sqlx_error;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: Decimal,
    image_url: String,
    likes: i64,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            image_url: row.image_url,
            likes: row.likes,
        }
    }
}

#[async_trait]
impl ProductStore for PostgresProducts {
    async fn fetch_all(&self) -> Result<Vec<ProductRecord>, RepoError> {
        let rows: Vec<ProductRow> = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, description, price, image_url, likes
            FROM products
            ORDER BY id ASC
            "#,
        )
        .fetch_all(self.read_pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ProductRecord::from).collect())
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<ProductRecord>, RepoError> {
        let row: Option<ProductRow> = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, description, price, image_url, likes
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.read_pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ProductRecord::from))
    }

    async fn fetch_likes(&self, id: i64) -> Result<Option<i64>, RepoError> {
        // Counter seeds derive from this value, so it must come from the
        // primary, not a possibly-lagging replica.
        let likes: Option<i64> = sqlx::query_scalar(r#"SELECT likes FROM products WHERE id = $1"#)
            .bind(id)
            .fetch_optional(self.write_pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(likes)
    }

    async fn increment_likes(&self, id: i64) -> Result<(), RepoError> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET likes = likes + 1
            WHERE id = $1
            RETURNING likes
            "#,
        )
        .bind(id)
        .fetch_optional(self.write_pool())
        .await
        .map_err(map_sqlx_error)?;

        match updated {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }

    async fn put_likes(&self, id: i64, likes: i64) -> Result<(), RepoError> {
        // GREATEST keeps the mirror monotonic when counter mirrors land out
        // of order under concurrent likes.
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET likes = GREATEST(likes, $2)
            WHERE id = $1
            RETURNING likes
            "#,
        )
        .bind(id)
        .bind(likes)
        .fetch_optional(self.write_pool())
        .await
        .map_err(map_sqlx_error)?;

        match updated {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}
