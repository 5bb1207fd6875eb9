use serde::{Deserialize, Serialize};

use crate::{CategoryId, Product, SubcategoryId};

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
    /// Catalog order (oldest first).
    #[default]
    Catalog,
    /// Most recently added first.
    Newest,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
}

impl ProductSort {
    /// Parses the storefront's sort keys (`newest`, `price-asc`, `price-desc`).
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "catalog" => Some(ProductSort::Catalog),
            "newest" => Some(ProductSort::Newest),
            "price-asc" => Some(ProductSort::PriceAsc),
            "price-desc" => Some(ProductSort::PriceDesc),
            _ => None,
        }
    }
}

/// Builder for product listing queries.
///
/// Empty selections mean "no filter": a query with no subcategories
/// selected matches every subcategory. A product matches a size selection
/// when it offers at least one of the selected sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Filter by category.
    pub category_id: Option<CategoryId>,

    /// Filter by subcategory.
    pub subcategory_id: Option<SubcategoryId>,

    /// Filter by subcategory names (any of these).
    pub subcategories: Vec<String>,

    /// Filter by offered sizes (any of these).
    pub sizes: Vec<String>,

    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,

    pub sort: ProductSort,

    /// Maximum number of products to return.
    pub limit: Option<usize>,

    /// Number of products to skip.
    pub offset: Option<usize>,
}

impl ProductQuery {
    /// Creates a query matching every product.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for the products of a category.
    pub fn for_category(category_id: CategoryId) -> Self {
        Self {
            category_id: Some(category_id),
            ..Default::default()
        }
    }

    /// Creates a query for the products of a subcategory.
    pub fn for_subcategory(subcategory_id: SubcategoryId) -> Self {
        Self {
            subcategory_id: Some(subcategory_id),
            ..Default::default()
        }
    }

    /// Filters by subcategory names (any of these).
    pub fn subcategories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subcategories = names.into_iter().map(Into::into).collect();
        self
    }

    /// Filters by offered sizes (any of these).
    pub fn sizes<I, S>(mut self, sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sizes = sizes.into_iter().map(Into::into).collect();
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn sort(mut self, sort: ProductSort) -> Self {
        self.sort = sort;
        self
    }

    /// Limits the number of products returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips this many products before returning results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if `product` passes every filter of this query.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(id) = self.category_id
            && product.category_id != id
        {
            return false;
        }
        if let Some(id) = self.subcategory_id
            && product.subcategory_id != id
        {
            return false;
        }
        if !self.subcategories.is_empty()
            && !self
                .subcategories
                .iter()
                .any(|name| name.eq_ignore_ascii_case(&product.subcategory))
        {
            return false;
        }
        if !self.sizes.is_empty()
            && !product
                .available_sizes
                .iter()
                .any(|size| self.sizes.contains(size))
        {
            return false;
        }
        if let Some(ref text) = self.search {
            let needle = text.trim().to_lowercase();
            if !needle.is_empty() && !product.name.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }

    /// Filters, sorts and pages `products`.
    ///
    /// The input is expected in catalog order (ascending id).
    pub fn apply(&self, products: impl IntoIterator<Item = Product>) -> Vec<Product> {
        let mut products: Vec<Product> = products.into_iter().filter(|p| self.matches(p)).collect();

        match self.sort {
            ProductSort::Catalog => products.sort_by_key(|p| p.id),
            ProductSort::Newest => products.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then(b.id.cmp(&a.id))
            }),
            ProductSort::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id))),
            ProductSort::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price).then(a.id.cmp(&b.id))),
        }

        let offset = self.offset.unwrap_or(0);
        let products = products.into_iter().skip(offset);
        match self.limit {
            Some(limit) => products.take(limit).collect(),
            None => products.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::{Money, ProductId};

    fn product(id: i64, subcategory: &str, price: i64, sizes: &[&str]) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Produto {id}"),
            price: Money::from_reais(price),
            description: None,
            image: String::new(),
            category_id: CategoryId::new(1),
            category: "Masculino".to_string(),
            subcategory_id: SubcategoryId::new(if subcategory == "Tênis" { 2 } else { 1 }),
            subcategory: subcategory.to_string(),
            available_sizes: sizes.iter().map(|s| s.to_string()).collect(),
            created_at: Utc::now() + Duration::seconds(id),
        }
    }

    fn fixtures() -> Vec<Product> {
        vec![
            product(1, "Camisetas", 50, &["P", "M"]),
            product(2, "Tênis", 300, &["39", "40"]),
            product(3, "Camisetas", 30, &["G"]),
            product(4, "Bonés", 40, &[]),
        ]
    }

    fn ids(products: &[Product]) -> Vec<i64> {
        products.iter().map(|p| p.id.get()).collect()
    }

    #[test]
    fn empty_query_matches_everything_in_catalog_order() {
        let result = ProductQuery::new().apply(fixtures().into_iter().rev());
        assert_eq!(ids(&result), vec![1, 2, 3, 4]);
    }

    #[test]
    fn filter_by_subcategory_names_is_case_insensitive() {
        let result = ProductQuery::new()
            .subcategories(["camisetas"])
            .apply(fixtures());
        assert_eq!(ids(&result), vec![1, 3]);
    }

    #[test]
    fn filter_by_sizes_matches_any_offered_size() {
        let result = ProductQuery::new().sizes(["M", "40"]).apply(fixtures());
        assert_eq!(ids(&result), vec![1, 2]);
    }

    #[test]
    fn filter_by_subcategory_id() {
        let result = ProductQuery::for_subcategory(SubcategoryId::new(2)).apply(fixtures());
        assert_eq!(ids(&result), vec![2]);
    }

    #[test]
    fn search_matches_name_substring() {
        let result = ProductQuery::new().search("produto 3").apply(fixtures());
        assert_eq!(ids(&result), vec![3]);
    }

    #[test]
    fn sort_by_price() {
        let asc = ProductQuery::new()
            .sort(ProductSort::PriceAsc)
            .apply(fixtures());
        assert_eq!(ids(&asc), vec![3, 4, 1, 2]);

        let desc = ProductQuery::new()
            .sort(ProductSort::PriceDesc)
            .apply(fixtures());
        assert_eq!(ids(&desc), vec![2, 1, 4, 3]);
    }

    #[test]
    fn sort_newest_first() {
        let result = ProductQuery::new()
            .sort(ProductSort::Newest)
            .apply(fixtures());
        assert_eq!(ids(&result), vec![4, 3, 2, 1]);
    }

    #[test]
    fn limit_and_offset_page_results() {
        let result = ProductQuery::new().offset(1).limit(2).apply(fixtures());
        assert_eq!(ids(&result), vec![2, 3]);
    }

    #[test]
    fn sort_keys_parse() {
        assert_eq!(ProductSort::from_key("price-asc"), Some(ProductSort::PriceAsc));
        assert_eq!(ProductSort::from_key("price-desc"), Some(ProductSort::PriceDesc));
        assert_eq!(ProductSort::from_key("newest"), Some(ProductSort::Newest));
        assert_eq!(ProductSort::from_key("random"), None);
    }
}
