use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{CreateProduct, Pagination, Product, ProductPlain, UpdateProduct};
use crate::repository::ProductRepository;

/// Service layer for product catalog business logic
#[derive(Clone)]
pub struct ProductCatalogService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductCatalogService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new product
    ///
    /// Returns the plain representation with the image URLs echoed back in
    /// the order they were supplied.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: CreateProduct) -> CatalogResult<ProductPlain> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        let urls = input.images.clone();
        let product = Product::new(input);
        let created = self.repository.create(product).await?;

        let mut plain = created.into_plain();
        plain.images = urls;
        Ok(plain)
    }

    /// List products with pagination, newest first
    #[instrument(skip(self))]
    pub async fn find_all(&self, pagination: Pagination) -> CatalogResult<Vec<ProductPlain>> {
        let products = self.repository.list(pagination).await?;
        Ok(products.into_iter().map(Product::into_plain).collect())
    }

    /// Find a single product by id, title, or slug
    ///
    /// Terms that parse as a UUID are looked up by id; anything else is
    /// matched against the title (case-insensitive) or the slug.
    #[instrument(skip(self))]
    pub async fn find_one(&self, term: &str) -> CatalogResult<Product> {
        let found = match Uuid::parse_str(term) {
            Ok(id) => self.repository.find_by_id(id).await?,
            Err(_) => self.repository.find_by_term(term).await?,
        };

        found.ok_or_else(|| CatalogError::NotFound(term.to_string()))
    }

    /// Find a single product and flatten its images to URLs
    #[instrument(skip(self))]
    pub async fn find_one_plain(&self, term: &str) -> CatalogResult<ProductPlain> {
        self.find_one(term).await.map(Product::into_plain)
    }

    /// Update a product by id
    ///
    /// The stored product is loaded first and the partial update merged onto
    /// it; omitted image lists clear the attached records.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateProduct) -> CatalogResult<Product> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        let mut product = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        product.apply_update(input);

        self.repository.replace(product).await
    }

    /// Delete a product by id, returning its final state
    ///
    /// The product is snapshotted before deletion so the caller gets the
    /// removed record back.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: Uuid) -> CatalogResult<Product> {
        let product = self.find_one(&id.to_string()).await?;

        let deleted = self.repository.delete_by_id(id).await?;
        if !deleted {
            return Err(CatalogError::NotFound(id.to_string()));
        }

        Ok(product)
    }
}
