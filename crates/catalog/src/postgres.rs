use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

use crate::{
    CatalogError, Category, CategoryId, Money, NewProduct, NewSubcategory, Product, ProductId,
    ProductQuery, ProductSort, Result, Subcategory, SubcategoryId,
    models::validate_name,
    store::{CatalogStore, record_query},
};

const PRODUCT_COLUMNS: &str = r#"
    SELECT
        p.id,
        p.nome,
        (p.preco * 100)::BIGINT AS preco_centavos,
        p.descricao,
        p.imagem,
        p.tamanhos,
        p.criado_em,
        s.id AS subcategoria_id,
        s.nome AS subcategoria,
        c.id AS categoria_id,
        c.nome AS categoria
    FROM produtos p
    JOIN subcategorias s ON p.subcategoria_id = s.id
    JOIN categorias c ON s.categoria_id = c.id
"#;

/// PostgreSQL-backed catalog store.
///
/// Prices are stored as `NUMERIC(10,2)` reais and cross the SQL boundary
/// as integer centavos.
#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    /// Creates a new PostgreSQL catalog store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("catalog migrations applied");
        Ok(())
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("nome")?,
            price: Money::from_cents(row.try_get("preco_centavos")?),
            description: row.try_get("descricao")?,
            image: row.try_get("imagem")?,
            category_id: CategoryId::new(row.try_get("categoria_id")?),
            category: row.try_get("categoria")?,
            subcategory_id: SubcategoryId::new(row.try_get("subcategoria_id")?),
            subcategory: row.try_get("subcategoria")?,
            available_sizes: row.try_get("tamanhos")?,
            created_at: row.try_get::<DateTime<Utc>, _>("criado_em")?,
        })
    }

    fn row_to_category(row: PgRow) -> Result<Category> {
        Ok(Category {
            id: CategoryId::new(row.try_get("id")?),
            name: row.try_get("nome")?,
        })
    }

    /// Loads subcategories with their category links, optionally for one id.
    async fn load_subcategories(&self, only: Option<SubcategoryId>) -> Result<Vec<Subcategory>> {
        let rows = sqlx::query(
            r#"
            SELECT id, nome FROM subcategorias
            WHERE $1::INT IS NULL OR id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(only.map(|id| id.get()))
        .fetch_all(&self.pool)
        .await?;

        let links = sqlx::query(
            r#"
            SELECT cs.subcategoria_id, c.id, c.nome
            FROM categoria_subcategoria cs
            JOIN categorias c ON c.id = cs.categoria_id
            WHERE $1::INT IS NULL OR cs.subcategoria_id = $1
            ORDER BY cs.subcategoria_id ASC, cs.posicao ASC
            "#,
        )
        .bind(only.map(|id| id.get()))
        .fetch_all(&self.pool)
        .await?;

        let mut categories: BTreeMap<i32, Vec<Category>> = BTreeMap::new();
        for row in links {
            let subcategory_id: i32 = row.try_get("subcategoria_id")?;
            categories
                .entry(subcategory_id)
                .or_default()
                .push(Self::row_to_category(row)?);
        }

        rows.into_iter()
            .map(|row| {
                let id: i32 = row.try_get("id")?;
                Ok(Subcategory {
                    id: SubcategoryId::new(id),
                    name: row.try_get("nome")?,
                    categories: categories.remove(&id).unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn ensure_subcategory_exists(&self, id: SubcategoryId) -> Result<()> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM subcategorias WHERE id = $1)")
                .bind(id.get())
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(CatalogError::SubcategoryNotFound(id));
        }
        Ok(())
    }

    async fn ensure_categories_exist(
        tx: &mut Transaction<'_, Postgres>,
        ids: &[CategoryId],
    ) -> Result<()> {
        for id in ids {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categorias WHERE id = $1)")
                    .bind(id.get())
                    .fetch_one(&mut **tx)
                    .await?;
            if !exists {
                return Err(CatalogError::CategoryNotFound(*id));
            }
        }
        Ok(())
    }

    async fn link_categories(
        tx: &mut Transaction<'_, Postgres>,
        subcategory_id: i32,
        ids: &[CategoryId],
    ) -> Result<()> {
        sqlx::query("DELETE FROM categoria_subcategoria WHERE subcategoria_id = $1")
            .bind(subcategory_id)
            .execute(&mut **tx)
            .await?;

        for (position, id) in ids.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO categoria_subcategoria (categoria_id, subcategoria_id, posicao)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(id.get())
            .bind(subcategory_id)
            .bind(position as i32)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

/// Maps a unique-constraint violation to `Duplicate`.
fn duplicate_or(entity: &'static str, name: &str) -> impl FnOnce(sqlx::Error) -> CatalogError {
    let name = name.to_string();
    move |e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return CatalogError::Duplicate { entity, name };
        }
        CatalogError::Database(e)
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        record_query("list_products");

        let mut sql = format!("{PRODUCT_COLUMNS} WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if query.category_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND c.id = ${param_count}"));
        }
        if query.subcategory_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND s.id = ${param_count}"));
        }
        if !query.subcategories.is_empty() {
            param_count += 1;
            sql.push_str(&format!(" AND LOWER(s.nome) = ANY(${param_count})"));
        }
        if !query.sizes.is_empty() {
            param_count += 1;
            sql.push_str(&format!(" AND p.tamanhos && ${param_count}"));
        }
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty());
        if search.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND p.nome ILIKE ${param_count}"));
        }

        sql.push_str(match query.sort {
            ProductSort::Catalog => " ORDER BY p.id ASC",
            ProductSort::Newest => " ORDER BY p.criado_em DESC, p.id DESC",
            ProductSort::PriceAsc => " ORDER BY p.preco ASC, p.id ASC",
            ProductSort::PriceDesc => " ORDER BY p.preco DESC, p.id ASC",
        });

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        // Build and execute query with parameters
        let mut sqlx_query = sqlx::query(&sql);

        if let Some(id) = query.category_id {
            sqlx_query = sqlx_query.bind(id.get());
        }
        if let Some(id) = query.subcategory_id {
            sqlx_query = sqlx_query.bind(id.get());
        }
        if !query.subcategories.is_empty() {
            let names: Vec<String> = query.subcategories.iter().map(|n| n.to_lowercase()).collect();
            sqlx_query = sqlx_query.bind(names);
        }
        if !query.sizes.is_empty() {
            sqlx_query = sqlx_query.bind(query.sizes.clone());
        }
        if let Some(text) = search {
            sqlx_query = sqlx_query.bind(format!("%{text}%"));
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn get_product(&self, id: ProductId) -> Result<Product> {
        record_query("get_product");
        let row = sqlx::query(&format!("{PRODUCT_COLUMNS} WHERE p.id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::row_to_product(row),
            None => Err(CatalogError::ProductNotFound(id)),
        }
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        record_query("create_product");
        product.validate()?;
        self.ensure_subcategory_exists(product.subcategory_id).await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO produtos (nome, preco, descricao, imagem, tamanhos, subcategoria_id)
            VALUES ($1, $2::NUMERIC / 100, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(product.name.trim())
        .bind(product.price.cents())
        .bind(&product.description)
        .bind(&product.image)
        .bind(product.normalized_sizes())
        .bind(product.subcategory_id.get())
        .fetch_one(&self.pool)
        .await?;

        self.get_product(ProductId::new(id)).await
    }

    async fn update_product(&self, id: ProductId, product: NewProduct) -> Result<Product> {
        record_query("update_product");
        product.validate()?;
        self.ensure_subcategory_exists(product.subcategory_id).await?;

        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE produtos
            SET nome = $1, preco = $2::NUMERIC / 100, descricao = $3, imagem = $4,
                tamanhos = $5, subcategoria_id = $6
            WHERE id = $7
            RETURNING id
            "#,
        )
        .bind(product.name.trim())
        .bind(product.price.cents())
        .bind(&product.description)
        .bind(&product.image)
        .bind(product.normalized_sizes())
        .bind(product.subcategory_id.get())
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(_) => self.get_product(id).await,
            None => Err(CatalogError::ProductNotFound(id)),
        }
    }

    async fn delete_product(&self, id: ProductId) -> Result<Product> {
        record_query("delete_product");
        let product = self.get_product(id).await?;
        sqlx::query("DELETE FROM produtos WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        Ok(product)
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        record_query("list_categories");
        let rows = sqlx::query("SELECT id, nome FROM categorias ORDER BY nome ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_category).collect()
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        record_query("find_category_by_name");
        let row = sqlx::query("SELECT id, nome FROM categorias WHERE LOWER(nome) = LOWER($1)")
            .bind(name.trim())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_category).transpose()
    }

    async fn create_category(&self, name: &str) -> Result<Category> {
        record_query("create_category");
        validate_name(name, "categoria")?;
        let name = name.trim();
        let row = sqlx::query("INSERT INTO categorias (nome) VALUES ($1) RETURNING id, nome")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(duplicate_or("categoria", name))?;
        Self::row_to_category(row)
    }

    async fn rename_category(&self, id: CategoryId, name: &str) -> Result<Category> {
        record_query("rename_category");
        validate_name(name, "categoria")?;
        let name = name.trim();
        let row = sqlx::query("UPDATE categorias SET nome = $1 WHERE id = $2 RETURNING id, nome")
            .bind(name)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(duplicate_or("categoria", name))?;
        match row {
            Some(row) => Self::row_to_category(row),
            None => Err(CatalogError::CategoryNotFound(id)),
        }
    }

    async fn delete_category(&self, id: CategoryId) -> Result<Category> {
        record_query("delete_category");
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT id, nome FROM categorias WHERE id = $1 FOR UPDATE")
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))?;
        let category = Self::row_to_category(row)?;

        let in_use: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categoria_subcategoria WHERE categoria_id = $1)",
        )
        .bind(id.get())
        .fetch_one(&mut *tx)
        .await?;
        if in_use {
            return Err(CatalogError::InUse {
                entity: "categoria",
                id: id.to_string(),
            });
        }

        sqlx::query("DELETE FROM categorias WHERE id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(category)
    }

    async fn list_subcategories(&self) -> Result<Vec<Subcategory>> {
        record_query("list_subcategories");
        self.load_subcategories(None).await
    }

    async fn get_subcategory(&self, id: SubcategoryId) -> Result<Subcategory> {
        record_query("get_subcategory");
        self.load_subcategories(Some(id))
            .await?
            .pop()
            .ok_or(CatalogError::SubcategoryNotFound(id))
    }

    async fn find_subcategory_by_name(&self, name: &str) -> Result<Option<Subcategory>> {
        record_query("find_subcategory_by_name");
        let id: Option<i32> = sqlx::query_scalar("SELECT id FROM subcategorias WHERE nome = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        match id {
            Some(id) => Ok(self
                .load_subcategories(Some(SubcategoryId::new(id)))
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn create_subcategory(&self, subcategory: NewSubcategory) -> Result<Subcategory> {
        record_query("create_subcategory");
        subcategory.validate()?;
        let category_ids = subcategory.unique_category_ids();
        let name = subcategory.name.trim();

        let primary = category_ids.first().copied().ok_or(CatalogError::NoCategories)?;

        let mut tx = self.pool.begin().await?;
        Self::ensure_categories_exist(&mut tx, &category_ids).await?;

        let id: i32 = sqlx::query_scalar(
            "INSERT INTO subcategorias (nome, categoria_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(name)
        .bind(primary.get())
        .fetch_one(&mut *tx)
        .await
        .map_err(duplicate_or("subcategoria", name))?;

        Self::link_categories(&mut tx, id, &category_ids).await?;
        tx.commit().await?;

        self.get_subcategory(SubcategoryId::new(id)).await
    }

    async fn update_subcategory(
        &self,
        id: SubcategoryId,
        subcategory: NewSubcategory,
    ) -> Result<Subcategory> {
        record_query("update_subcategory");
        subcategory.validate()?;
        let category_ids = subcategory.unique_category_ids();
        let name = subcategory.name.trim();

        let primary = category_ids.first().copied().ok_or(CatalogError::NoCategories)?;

        let mut tx = self.pool.begin().await?;
        Self::ensure_categories_exist(&mut tx, &category_ids).await?;

        let updated: Option<i32> = sqlx::query_scalar(
            "UPDATE subcategorias SET nome = $1, categoria_id = $2 WHERE id = $3 RETURNING id",
        )
        .bind(name)
        .bind(primary.get())
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(duplicate_or("subcategoria", name))?;
        if updated.is_none() {
            return Err(CatalogError::SubcategoryNotFound(id));
        }

        Self::link_categories(&mut tx, id.get(), &category_ids).await?;
        tx.commit().await?;

        self.get_subcategory(id).await
    }

    async fn delete_subcategory(&self, id: SubcategoryId) -> Result<Subcategory> {
        record_query("delete_subcategory");
        let subcategory = self.get_subcategory(id).await?;

        let in_use: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM produtos WHERE subcategoria_id = $1)")
                .bind(id.get())
                .fetch_one(&self.pool)
                .await?;
        if in_use {
            return Err(CatalogError::InUse {
                entity: "subcategoria",
                id: id.to_string(),
            });
        }

        sqlx::query("DELETE FROM subcategorias WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        Ok(subcategory)
    }
}
