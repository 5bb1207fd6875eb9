use async_trait::async_trait;

use crate::{
    CatalogError, Category, CategoryId, NewProduct, NewSubcategory, Product, ProductId,
    ProductQuery, Result, Subcategory, SubcategoryId,
};

/// Core trait for catalog store implementations.
///
/// A catalog store persists products, categories and subcategories.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Lists products matching a query.
    ///
    /// Category and subcategory names are resolved at read time.
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>>;

    /// Retrieves a product by id.
    async fn get_product(&self, id: ProductId) -> Result<Product>;

    /// Creates a product. Fails with `SubcategoryNotFound` if the
    /// subcategory does not exist.
    async fn create_product(&self, product: NewProduct) -> Result<Product>;

    /// Replaces every field of an existing product.
    async fn update_product(&self, id: ProductId, product: NewProduct) -> Result<Product>;

    /// Deletes a product and returns the removed record.
    async fn delete_product(&self, id: ProductId) -> Result<Product>;

    /// Lists every category ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Finds a category by name, ignoring case.
    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>>;

    async fn create_category(&self, name: &str) -> Result<Category>;

    async fn rename_category(&self, id: CategoryId, name: &str) -> Result<Category>;

    /// Deletes a category. Fails with `InUse` while subcategories link it.
    async fn delete_category(&self, id: CategoryId) -> Result<Category>;

    /// Lists every subcategory with its linked categories.
    async fn list_subcategories(&self) -> Result<Vec<Subcategory>>;

    async fn get_subcategory(&self, id: SubcategoryId) -> Result<Subcategory>;

    /// Finds a subcategory by exact name.
    async fn find_subcategory_by_name(&self, name: &str) -> Result<Option<Subcategory>>;

    /// Creates a subcategory. Fails with `CategoryNotFound` if any linked
    /// category does not exist.
    async fn create_subcategory(&self, subcategory: NewSubcategory) -> Result<Subcategory>;

    /// Replaces the name and category links of a subcategory.
    async fn update_subcategory(
        &self,
        id: SubcategoryId,
        subcategory: NewSubcategory,
    ) -> Result<Subcategory>;

    /// Deletes a subcategory. Fails with `InUse` while products reference it.
    async fn delete_subcategory(&self, id: SubcategoryId) -> Result<Subcategory>;
}

/// Extension trait providing convenience methods for catalog stores.
#[async_trait]
pub trait CatalogStoreExt: CatalogStore {
    /// Lists every product in catalog order.
    async fn all_products(&self) -> Result<Vec<Product>> {
        self.list_products(&ProductQuery::new()).await
    }

    /// Lists the products of the category with this name (case-insensitive).
    async fn products_in_category_named(&self, name: &str) -> Result<Vec<Product>> {
        let category = self
            .find_category_by_name(name)
            .await?
            .ok_or_else(|| CatalogError::CategoryNameNotFound(name.to_string()))?;
        self.list_products(&ProductQuery::for_category(category.id))
            .await
    }

    /// Lists the products of a subcategory, failing if it does not exist.
    async fn products_in_subcategory(&self, id: SubcategoryId) -> Result<Vec<Product>> {
        self.get_subcategory(id).await?;
        self.list_products(&ProductQuery::for_subcategory(id)).await
    }

    /// Resolves a subcategory by name, failing with `SubcategoryNameNotFound`.
    async fn subcategory_named(&self, name: &str) -> Result<Subcategory> {
        self.find_subcategory_by_name(name)
            .await?
            .ok_or_else(|| CatalogError::SubcategoryNameNotFound(name.to_string()))
    }
}

// Blanket implementation for all CatalogStore implementations
impl<T: CatalogStore + ?Sized> CatalogStoreExt for T {}

/// Counts a store operation under `catalog_queries_total`.
pub(crate) fn record_query(operation: &'static str) {
    metrics::counter!("catalog_queries_total", "operation" => operation).increment(1);
}
