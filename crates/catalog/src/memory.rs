use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    CatalogError, Category, CategoryId, Money, NewProduct, NewSubcategory, Product, ProductId,
    ProductQuery, Result, Subcategory, SubcategoryId,
    models::validate_name,
    store::{CatalogStore, record_query},
};

#[derive(Debug, Clone)]
struct StoredSubcategory {
    name: String,
    category_ids: Vec<CategoryId>,
}

#[derive(Debug, Clone)]
struct StoredProduct {
    name: String,
    price: Money,
    description: Option<String>,
    image: String,
    subcategory_id: SubcategoryId,
    sizes: Vec<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct CatalogState {
    categories: BTreeMap<CategoryId, String>,
    subcategories: BTreeMap<SubcategoryId, StoredSubcategory>,
    products: BTreeMap<ProductId, StoredProduct>,
    next_category: i32,
    next_subcategory: i32,
    next_product: i64,
}

impl CatalogState {
    fn category(&self, id: CategoryId) -> Result<Category> {
        self.categories
            .get(&id)
            .map(|name| Category {
                id,
                name: name.clone(),
            })
            .ok_or(CatalogError::CategoryNotFound(id))
    }

    fn subcategory(&self, id: SubcategoryId) -> Result<Subcategory> {
        let stored = self
            .subcategories
            .get(&id)
            .ok_or(CatalogError::SubcategoryNotFound(id))?;
        let categories = stored
            .category_ids
            .iter()
            .filter_map(|id| self.category(*id).ok())
            .collect();
        Ok(Subcategory {
            id,
            name: stored.name.clone(),
            categories,
        })
    }

    fn product(&self, id: ProductId) -> Result<Product> {
        let stored = self
            .products
            .get(&id)
            .ok_or(CatalogError::ProductNotFound(id))?;
        let subcategory = self.subcategory(stored.subcategory_id)?;
        let (category_id, category) = subcategory
            .primary_category()
            .map(|c| (c.id, c.name.clone()))
            .unwrap_or((CategoryId::new(0), String::new()));

        Ok(Product {
            id,
            name: stored.name.clone(),
            price: stored.price,
            description: stored.description.clone(),
            image: stored.image.clone(),
            category_id,
            category,
            subcategory_id: subcategory.id,
            subcategory: subcategory.name,
            available_sizes: stored.sizes.clone(),
            created_at: stored.created_at,
        })
    }

    fn check_category_name(&self, name: &str, except: Option<CategoryId>) -> Result<()> {
        let taken = self
            .categories
            .iter()
            .any(|(id, existing)| Some(*id) != except && existing.eq_ignore_ascii_case(name));
        if taken {
            return Err(CatalogError::Duplicate {
                entity: "categoria",
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn check_subcategory(&self, sub: &NewSubcategory, except: Option<SubcategoryId>) -> Result<()> {
        sub.validate()?;
        for id in &sub.category_ids {
            self.category(*id)?;
        }
        let taken = self
            .subcategories
            .iter()
            .any(|(id, existing)| Some(*id) != except && existing.name == sub.name.trim());
        if taken {
            return Err(CatalogError::Duplicate {
                entity: "subcategoria",
                name: sub.name.clone(),
            });
        }
        Ok(())
    }

    fn stored_product(&self, product: &NewProduct, created_at: DateTime<Utc>) -> Result<StoredProduct> {
        product.validate()?;
        if !self.subcategories.contains_key(&product.subcategory_id) {
            return Err(CatalogError::SubcategoryNotFound(product.subcategory_id));
        }
        Ok(StoredProduct {
            name: product.name.trim().to_string(),
            price: product.price,
            description: product.description.clone(),
            image: product.image.clone(),
            subcategory_id: product.subcategory_id,
            sizes: product.normalized_sizes(),
            created_at,
        })
    }
}

/// In-memory catalog store.
///
/// Serves as the catalog when no database is configured and as the store
/// behind unit and API tests. Mirrors the PostgreSQL store's behaviour,
/// including name uniqueness and referential checks on delete.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalogStore {
    /// Creates a new empty in-memory catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog with demo categories, subcategories and products.
    pub fn seeded() -> Self {
        let mut state = CatalogState::default();

        for name in ["Masculino", "Feminino"] {
            state.next_category += 1;
            state
                .categories
                .insert(CategoryId::new(state.next_category), name.to_string());
        }

        let both = vec![CategoryId::new(1), CategoryId::new(2)];
        let subcategories = [
            ("Camisetas", both.clone()),
            ("Calças", both.clone()),
            ("Tênis", both),
            ("Vestidos", vec![CategoryId::new(2)]),
        ];
        for (name, category_ids) in subcategories {
            state.next_subcategory += 1;
            state.subcategories.insert(
                SubcategoryId::new(state.next_subcategory),
                StoredSubcategory {
                    name: name.to_string(),
                    category_ids,
                },
            );
        }

        let clothing = ["P", "M", "G", "GG"];
        let shoes = ["38", "39", "40", "41", "42"];
        let products: [(&str, i64, i32, &[&str]); 6] = [
            ("Camiseta Básica Branca", 4990, 1, &clothing),
            ("Camiseta Estampada", 6990, 1, &clothing),
            ("Calça Jeans Slim", 12990, 2, &clothing),
            ("Tênis Casual Couro", 24990, 3, &shoes),
            ("Vestido Floral", 15990, 4, &["P", "M", "G"]),
            ("Vestido Longo Festa", 29990, 4, &["P", "M", "G"]),
        ];
        let now = Utc::now();
        for (name, cents, subcategory, sizes) in products {
            state.next_product += 1;
            let slug = name.to_lowercase().replace(' ', "-");
            state.products.insert(
                ProductId::new(state.next_product),
                StoredProduct {
                    name: name.to_string(),
                    price: Money::from_cents(cents),
                    description: None,
                    image: format!("/images/{slug}.jpg"),
                    subcategory_id: SubcategoryId::new(subcategory),
                    sizes: sizes.iter().map(|s| s.to_string()).collect(),
                    created_at: now + chrono::Duration::seconds(state.next_product),
                },
            );
        }

        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Returns the number of stored products.
    pub async fn product_count(&self) -> usize {
        self.state.read().await.products.len()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        record_query("list_products");
        let state = self.state.read().await;
        let products = state
            .products
            .keys()
            .map(|id| state.product(*id))
            .collect::<Result<Vec<_>>>()?;
        Ok(query.apply(products))
    }

    async fn get_product(&self, id: ProductId) -> Result<Product> {
        record_query("get_product");
        self.state.read().await.product(id)
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        record_query("create_product");
        let mut state = self.state.write().await;
        let stored = state.stored_product(&product, Utc::now())?;
        state.next_product += 1;
        let id = ProductId::new(state.next_product);
        state.products.insert(id, stored);
        state.product(id)
    }

    async fn update_product(&self, id: ProductId, product: NewProduct) -> Result<Product> {
        record_query("update_product");
        let mut state = self.state.write().await;
        let created_at = state
            .products
            .get(&id)
            .map(|p| p.created_at)
            .ok_or(CatalogError::ProductNotFound(id))?;
        let stored = state.stored_product(&product, created_at)?;
        state.products.insert(id, stored);
        state.product(id)
    }

    async fn delete_product(&self, id: ProductId) -> Result<Product> {
        record_query("delete_product");
        let mut state = self.state.write().await;
        let product = state.product(id)?;
        state.products.remove(&id);
        Ok(product)
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        record_query("list_categories");
        let state = self.state.read().await;
        let mut categories: Vec<Category> = state
            .categories
            .iter()
            .map(|(id, name)| Category {
                id: *id,
                name: name.clone(),
            })
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        record_query("find_category_by_name");
        let state = self.state.read().await;
        let needle = name.trim().to_lowercase();
        Ok(state
            .categories
            .iter()
            .find(|(_, existing)| existing.to_lowercase() == needle)
            .map(|(id, existing)| Category {
                id: *id,
                name: existing.clone(),
            }))
    }

    async fn create_category(&self, name: &str) -> Result<Category> {
        record_query("create_category");
        validate_name(name, "categoria")?;
        let mut state = self.state.write().await;
        let name = name.trim();
        state.check_category_name(name, None)?;
        state.next_category += 1;
        let id = CategoryId::new(state.next_category);
        state.categories.insert(id, name.to_string());
        state.category(id)
    }

    async fn rename_category(&self, id: CategoryId, name: &str) -> Result<Category> {
        record_query("rename_category");
        validate_name(name, "categoria")?;
        let mut state = self.state.write().await;
        state.category(id)?;
        let name = name.trim();
        state.check_category_name(name, Some(id))?;
        state.categories.insert(id, name.to_string());
        state.category(id)
    }

    async fn delete_category(&self, id: CategoryId) -> Result<Category> {
        record_query("delete_category");
        let mut state = self.state.write().await;
        let category = state.category(id)?;
        if state
            .subcategories
            .values()
            .any(|sub| sub.category_ids.contains(&id))
        {
            return Err(CatalogError::InUse {
                entity: "categoria",
                id: id.to_string(),
            });
        }
        state.categories.remove(&id);
        Ok(category)
    }

    async fn list_subcategories(&self) -> Result<Vec<Subcategory>> {
        record_query("list_subcategories");
        let state = self.state.read().await;
        state
            .subcategories
            .keys()
            .map(|id| state.subcategory(*id))
            .collect()
    }

    async fn get_subcategory(&self, id: SubcategoryId) -> Result<Subcategory> {
        record_query("get_subcategory");
        self.state.read().await.subcategory(id)
    }

    async fn find_subcategory_by_name(&self, name: &str) -> Result<Option<Subcategory>> {
        record_query("find_subcategory_by_name");
        let state = self.state.read().await;
        match state.subcategories.iter().find(|(_, sub)| sub.name == name) {
            Some((id, _)) => state.subcategory(*id).map(Some),
            None => Ok(None),
        }
    }

    async fn create_subcategory(&self, subcategory: NewSubcategory) -> Result<Subcategory> {
        record_query("create_subcategory");
        let mut state = self.state.write().await;
        state.check_subcategory(&subcategory, None)?;
        state.next_subcategory += 1;
        let id = SubcategoryId::new(state.next_subcategory);
        state.subcategories.insert(
            id,
            StoredSubcategory {
                name: subcategory.name.trim().to_string(),
                category_ids: subcategory.unique_category_ids(),
            },
        );
        state.subcategory(id)
    }

    async fn update_subcategory(
        &self,
        id: SubcategoryId,
        subcategory: NewSubcategory,
    ) -> Result<Subcategory> {
        record_query("update_subcategory");
        let mut state = self.state.write().await;
        state.subcategory(id)?;
        state.check_subcategory(&subcategory, Some(id))?;
        state.subcategories.insert(
            id,
            StoredSubcategory {
                name: subcategory.name.trim().to_string(),
                category_ids: subcategory.unique_category_ids(),
            },
        );
        state.subcategory(id)
    }

    async fn delete_subcategory(&self, id: SubcategoryId) -> Result<Subcategory> {
        record_query("delete_subcategory");
        let mut state = self.state.write().await;
        let subcategory = state.subcategory(id)?;
        if state.products.values().any(|p| p.subcategory_id == id) {
            return Err(CatalogError::InUse {
                entity: "subcategoria",
                id: id.to_string(),
            });
        }
        state.subcategories.remove(&id);
        Ok(subcategory)
    }
}
