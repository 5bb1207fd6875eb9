//! Catalog records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CatalogError, CategoryId, Money, ProductId, Result, SubcategoryId};

/// Sizes offered when a product is created without an explicit size list.
pub const DEFAULT_SIZES: [&str; 4] = ["P", "M", "G", "GG"];

/// A product as listed by the catalog.
///
/// Category and subcategory names are resolved through the subcategory's
/// primary category at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: String,
    pub category_id: CategoryId,
    pub category: String,
    pub subcategory_id: SubcategoryId,
    pub subcategory: String,
    #[serde(default)]
    pub available_sizes: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns true if the product is sold in sizes.
    pub fn has_sizes(&self) -> bool {
        !self.available_sizes.is_empty()
    }

    /// Returns true if `size` is one of the offered sizes.
    pub fn offers_size(&self, size: &str) -> bool {
        self.available_sizes.iter().any(|s| s == size)
    }
}

/// Data for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub description: Option<String>,
    pub image: String,
    pub subcategory_id: SubcategoryId,
    pub available_sizes: Vec<String>,
}

impl NewProduct {
    /// Creates product data with the default size grid.
    pub fn new(name: impl Into<String>, price: Money, subcategory_id: SubcategoryId) -> Self {
        Self {
            name: name.into(),
            price,
            description: None,
            image: String::new(),
            subcategory_id,
            available_sizes: DEFAULT_SIZES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Sets the image URL.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the offered sizes.
    pub fn with_sizes<I, S>(mut self, sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available_sizes = sizes.into_iter().map(Into::into).collect();
        self
    }

    /// Checks the invariants shared by every store: a non-empty name and a
    /// non-negative price.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name, "produto")?;
        if self.price.is_negative() {
            return Err(CatalogError::InvalidPrice(self.price));
        }
        Ok(())
    }

    /// Returns the size list with blanks and duplicates removed, order kept.
    pub fn normalized_sizes(&self) -> Vec<String> {
        let mut sizes: Vec<String> = Vec::with_capacity(self.available_sizes.len());
        for size in &self.available_sizes {
            let size = size.trim();
            if !size.is_empty() && !sizes.iter().any(|s| s == size) {
                sizes.push(size.to_string());
            }
        }
        sizes
    }
}

/// A top-level category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A subcategory linked to one or more categories.
///
/// The first entry of `categories` is the primary category used when
/// resolving a product's category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub name: String,
    pub categories: Vec<Category>,
}

impl Subcategory {
    /// Returns the primary category, if any.
    pub fn primary_category(&self) -> Option<&Category> {
        self.categories.first()
    }

    /// Returns true if the subcategory is linked to `category_id`.
    pub fn belongs_to(&self, category_id: CategoryId) -> bool {
        self.categories.iter().any(|c| c.id == category_id)
    }
}

/// Data for creating or replacing a subcategory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubcategory {
    pub name: String,
    /// Linked categories; the first one becomes the primary category.
    pub category_ids: Vec<CategoryId>,
}

impl NewSubcategory {
    pub fn new(name: impl Into<String>, category_ids: Vec<CategoryId>) -> Self {
        Self {
            name: name.into(),
            category_ids,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name, "subcategoria")?;
        if self.category_ids.is_empty() {
            return Err(CatalogError::NoCategories);
        }
        Ok(())
    }

    /// Returns the category ids with duplicates removed, order kept.
    pub fn unique_category_ids(&self) -> Vec<CategoryId> {
        let mut ids = Vec::with_capacity(self.category_ids.len());
        for id in &self.category_ids {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }
}

pub(crate) fn validate_name(name: &str, entity: &'static str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CatalogError::InvalidName { entity });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_product_uses_default_sizes() {
        let product = NewProduct::new("Camiseta", Money::from_reais(50), SubcategoryId::new(1));
        assert_eq!(product.available_sizes, vec!["P", "M", "G", "GG"]);
        assert!(product.validate().is_ok());
    }

    #[test]
    fn new_product_rejects_blank_name_and_negative_price() {
        let blank = NewProduct::new("   ", Money::from_reais(50), SubcategoryId::new(1));
        assert!(matches!(
            blank.validate(),
            Err(CatalogError::InvalidName { .. })
        ));

        let negative = NewProduct::new("Boné", Money::from_cents(-1), SubcategoryId::new(1));
        assert!(matches!(
            negative.validate(),
            Err(CatalogError::InvalidPrice(_))
        ));
    }

    #[test]
    fn free_products_are_allowed() {
        let free = NewProduct::new("Brinde", Money::zero(), SubcategoryId::new(1));
        assert!(free.validate().is_ok());
    }

    #[test]
    fn normalized_sizes_drop_blanks_and_duplicates() {
        let product = NewProduct::new("Tênis", Money::from_reais(200), SubcategoryId::new(1))
            .with_sizes(["38", " 39 ", "", "38", "40"]);
        assert_eq!(product.normalized_sizes(), vec!["38", "39", "40"]);
    }

    #[test]
    fn new_subcategory_requires_a_category() {
        let sub = NewSubcategory::new("Camisetas", vec![]);
        assert!(matches!(sub.validate(), Err(CatalogError::NoCategories)));

        let sub = NewSubcategory::new(
            "Camisetas",
            vec![CategoryId::new(2), CategoryId::new(1), CategoryId::new(2)],
        );
        assert!(sub.validate().is_ok());
        assert_eq!(
            sub.unique_category_ids(),
            vec![CategoryId::new(2), CategoryId::new(1)]
        );
    }

    #[test]
    fn subcategory_primary_category_is_first() {
        let sub = Subcategory {
            id: SubcategoryId::new(1),
            name: "Tênis".to_string(),
            categories: vec![
                Category {
                    id: CategoryId::new(2),
                    name: "Feminino".to_string(),
                },
                Category {
                    id: CategoryId::new(1),
                    name: "Masculino".to_string(),
                },
            ],
        };
        assert_eq!(sub.primary_category().map(|c| c.id), Some(CategoryId::new(2)));
        assert!(sub.belongs_to(CategoryId::new(1)));
        assert!(!sub.belongs_to(CategoryId::new(3)));
    }
}
