use thiserror::Error;

use crate::{CategoryId, Money, ProductId, SubcategoryId};

/// Errors that can occur when interacting with the catalog store.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No product with this identifier exists.
    #[error("Produto não encontrado: {0}")]
    ProductNotFound(ProductId),

    /// No category with this identifier exists.
    #[error("Categoria não encontrada: {0}")]
    CategoryNotFound(CategoryId),

    /// No category with this name exists.
    #[error("Categoria não encontrada: {0}")]
    CategoryNameNotFound(String),

    /// No subcategory with this identifier exists.
    #[error("Subcategoria não encontrada: {0}")]
    SubcategoryNotFound(SubcategoryId),

    /// No subcategory with this name exists.
    #[error("Subcategoria não encontrada: {0}")]
    SubcategoryNameNotFound(String),

    /// Prices must not be negative.
    #[error("Preço inválido: {0}")]
    InvalidPrice(Money),

    /// Names must contain at least one non-whitespace character.
    #[error("Nome inválido para {entity}")]
    InvalidName { entity: &'static str },

    /// A subcategory must belong to at least one category.
    #[error("Subcategoria precisa de ao menos uma categoria")]
    NoCategories,

    /// Another record already uses this name.
    #[error("Já existe {entity} com o nome {name}")]
    Duplicate { entity: &'static str, name: String },

    /// The record is still referenced and cannot be deleted.
    #[error("{entity} {id} ainda está em uso")]
    InUse { entity: &'static str, id: String },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl CatalogError {
    /// Returns true for errors caused by a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::ProductNotFound(_)
                | CatalogError::CategoryNotFound(_)
                | CatalogError::CategoryNameNotFound(_)
                | CatalogError::SubcategoryNotFound(_)
        )
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
