//! Domain entities mirrored from persistent storage.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog item.
///
/// `likes` is the only field the write path mutates; it starts at 0 and is
/// monotonically non-decreasing. The serialized form doubles as the cached
/// list payload, so the cache and the API stay bit-compatible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Fixed-point price; serialized as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image_url: String,
    pub likes: i64,
}
