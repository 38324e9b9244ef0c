use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Pagination, Product};

/// Repository trait for Product persistence
///
/// Lookups return `Ok(None)` when nothing matches; errors are reserved for
/// storage failures. The service layer turns misses into `NotFound`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persist a new product together with its image records
    async fn create(&self, product: Product) -> CatalogResult<Product>;

    /// List products with pagination, newest first, images attached
    async fn list(&self, pagination: Pagination) -> CatalogResult<Vec<Product>>;

    /// Find a product by its id
    async fn find_by_id(&self, id: Uuid) -> CatalogResult<Option<Product>>;

    /// Find a product by title (case-insensitive) or slug (lowercased)
    async fn find_by_term(&self, term: &str) -> CatalogResult<Option<Product>>;

    /// Replace a stored product with the given state, including its images
    async fn replace(&self, product: Product) -> CatalogResult<Product>;

    /// Delete a product by id; returns whether a row was removed
    async fn delete_by_id(&self, id: Uuid) -> CatalogResult<bool>;
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            products: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: Product) -> CatalogResult<Product> {
        let mut products = self.products.write().await;

        // Mirror the unique constraints on title and slug
        if let Some(existing) = products
            .values()
            .find(|p| p.title == product.title || p.slug == product.slug)
        {
            let detail = if existing.title == product.title {
                format!("Key (title)=({}) already exists.", product.title)
            } else {
                format!("Key (slug)=({}) already exists.", product.slug)
            };
            return Err(CatalogError::Duplicate(detail));
        }

        products.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    async fn list(&self, pagination: Pagination) -> CatalogResult<Vec<Product>> {
        let products = self.products.read().await;

        let mut result: Vec<Product> = products.values().cloned().collect();

        // Sort by created_at descending (newest first)
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let result: Vec<Product> = result
            .into_iter()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .collect();

        Ok(result)
    }

    async fn find_by_id(&self, id: Uuid) -> CatalogResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn find_by_term(&self, term: &str) -> CatalogResult<Option<Product>> {
        let products = self.products.read().await;
        // Uppercase comparison to match the UPPER(title) lookup in Postgres
        let term_upper = term.to_uppercase();
        let found = products
            .values()
            .find(|p| p.title.to_uppercase() == term_upper || p.slug == term.to_lowercase())
            .cloned();
        Ok(found)
    }

    async fn replace(&self, product: Product) -> CatalogResult<Product> {
        let mut products = self.products.write().await;

        if !products.contains_key(&product.id) {
            return Err(CatalogError::NotFound(product.id.to_string()));
        }

        // Mirror the unique constraints against other rows
        if let Some(existing) = products
            .values()
            .find(|p| p.id != product.id && (p.title == product.title || p.slug == product.slug))
        {
            let detail = if existing.title == product.title {
                format!("Key (title)=({}) already exists.", product.title)
            } else {
                format!("Key (slug)=({}) already exists.", product.slug)
            };
            return Err(CatalogError::Duplicate(detail));
        }

        products.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, "Updated product");
        Ok(product)
    }

    async fn delete_by_id(&self, id: Uuid) -> CatalogResult<bool> {
        let mut products = self.products.write().await;

        if products.remove(&id).is_some() {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateProduct, Gender};

    fn create_input(title: &str) -> CreateProduct {
        CreateProduct {
            title: title.to_string(),
            slug: None,
            description: None,
            price: 10.0,
            stock: 3,
            sizes: vec![],
            gender: Gender::Unisex,
            tags: vec![],
            images: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_and_find_product() {
        let repo = InMemoryProductRepository::new();

        let product = repo.create(Product::new(create_input("Raven Shirt"))).await.unwrap();
        assert_eq!(product.title, "Raven Shirt");

        let fetched = repo.find_by_id(product.id).await.unwrap();
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().id, product.id);
    }

    #[tokio::test]
    async fn test_duplicate_title_error() {
        let repo = InMemoryProductRepository::new();

        repo.create(Product::new(create_input("Raven Shirt"))).await.unwrap();

        let result = repo.create(Product::new(create_input("Raven Shirt"))).await;
        assert!(matches!(result, Err(CatalogError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_duplicate_slug_with_distinct_titles_error() {
        let repo = InMemoryProductRepository::new();

        let mut first = create_input("Raven Shirt");
        first.slug = Some("shared_slug".to_string());
        repo.create(Product::new(first)).await.unwrap();

        let mut second = create_input("Crow Shirt");
        second.slug = Some("shared_slug".to_string());
        let result = repo.create(Product::new(second)).await;

        match result {
            Err(CatalogError::Duplicate(detail)) => assert!(detail.contains("shared_slug")),
            other => panic!("expected Duplicate, got {:?}", other.map(|p| p.title)),
        }
    }

    #[tokio::test]
    async fn test_find_by_term_matches_title_case_insensitive() {
        let repo = InMemoryProductRepository::new();
        repo.create(Product::new(create_input("Raven Shirt"))).await.unwrap();

        let by_title = repo.find_by_term("raven shirt").await.unwrap();
        assert!(by_title.is_some());

        // Case folding goes through Unicode uppercasing, not ASCII-only
        repo.create(Product::new(create_input("Café Tee"))).await.unwrap();
        let by_unicode_title = repo.find_by_term("CAFÉ TEE").await.unwrap();
        assert!(by_unicode_title.is_some());

        let by_slug = repo.find_by_term("raven_shirt").await.unwrap();
        assert!(by_slug.is_some());

        let missing = repo.find_by_term("no_such_product").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_list_pagination_newest_first() {
        let repo = InMemoryProductRepository::new();
        for i in 0..5 {
            repo.create(Product::new(create_input(&format!("Product {}", i))))
                .await
                .unwrap();
        }

        let page = repo
            .list(Pagination {
                limit: 2,
                offset: 1,
            })
            .await
            .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].title, "Product 3");
        assert_eq!(page[1].title, "Product 2");
    }

    #[tokio::test]
    async fn test_delete_returns_false_for_missing() {
        let repo = InMemoryProductRepository::new();
        let deleted = repo.delete_by_id(Uuid::now_v7()).await.unwrap();
        assert!(!deleted);
    }
}
