//! Shared types for the storefront workspace.

pub mod money;
pub mod types;

pub use money::{Money, MoneyParseError};
pub use types::{CategoryId, ProductId, SubcategoryId};
