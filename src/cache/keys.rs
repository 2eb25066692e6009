use std::fmt;

/// Cache key layout shared by every backend.
///
/// The rendered strings are part of the deployed wire format: operators
/// inspect and delete these keys by hand, and older instances of the
/// service read the same keyspace during rolling deploys. Changing a
/// rendering is a breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey {
    /// The serialized full product list, `product:list`.
    List,
    /// The like counter for one product, `product:<id>:likes`.
    Likes(i64),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::List => f.write_str("product:list"),
            CacheKey::Likes(id) => write!(f, "product:{id}:likes"),
        }
    }
}
