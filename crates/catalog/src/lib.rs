pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod query;
pub mod store;

pub use common::{CategoryId, Money, ProductId, SubcategoryId};
pub use error::{CatalogError, Result};
pub use memory::InMemoryCatalogStore;
pub use models::{Category, DEFAULT_SIZES, NewProduct, NewSubcategory, Product, Subcategory};
pub use postgres::PostgresCatalogStore;
pub use query::{ProductQuery, ProductSort};
pub use store::{CatalogStore, CatalogStoreExt};
