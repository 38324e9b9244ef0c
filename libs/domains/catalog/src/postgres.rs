use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::sea_query::{Expr, ExprTrait, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, LoaderTrait,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity::{product, product_image},
    error::{CatalogError, CatalogResult},
    models::{Pagination, Product},
    repository::ProductRepository,
};

pub struct PgProductRepository {
    base: BaseRepository<product::Entity>,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

/// Map a storage error onto the domain error type.
///
/// Unique constraint violations keep their driver-provided detail so clients
/// can see which key collided. Anything without a recognizable shape is
/// logged and collapsed to the opaque internal error.
fn classify(err: DbErr) -> CatalogError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => CatalogError::Duplicate(detail),
        _ => {
            tracing::error!(error = %err, "Unhandled database error");
            CatalogError::Internal
        }
    }
}

fn attach_images(model: product::Model, images: Vec<product_image::Model>) -> Product {
    let mut product: Product = model.into();
    product.images = images.into_iter().map(Into::into).collect();
    product
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, product: Product) -> CatalogResult<Product> {
        // Product row and image rows are written atomically
        let tx = self.base.db().begin().await.map_err(classify)?;

        let active_model: product::ActiveModel = (&product).into();
        active_model.insert(&tx).await.map_err(classify)?;

        if !product.images.is_empty() {
            let rows = product
                .images
                .iter()
                .map(|image| product_image::active_model_for(product.id, image));
            product_image::Entity::insert_many(rows)
                .exec(&tx)
                .await
                .map_err(classify)?;
        }

        tx.commit().await.map_err(classify)?;

        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    async fn list(&self, pagination: Pagination) -> CatalogResult<Vec<Product>> {
        let models = product::Entity::find()
            .order_by_desc(product::Column::CreatedAt)
            .limit(pagination.limit)
            .offset(pagination.offset)
            .all(self.base.db())
            .await
            .map_err(classify)?;

        // Batch-load images for the page instead of joining, so the
        // limit/offset apply to products rather than joined rows
        let images = models
            .load_many(product_image::Entity, self.base.db())
            .await
            .map_err(classify)?;

        Ok(models
            .into_iter()
            .zip(images)
            .map(|(model, images)| attach_images(model, images))
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> CatalogResult<Option<Product>> {
        let Some(model) = self.base.find_by_id(id).await.map_err(classify)? else {
            return Ok(None);
        };

        let images = model
            .find_related(product_image::Entity)
            .all(self.base.db())
            .await
            .map_err(classify)?;

        Ok(Some(attach_images(model, images)))
    }

    async fn find_by_term(&self, term: &str) -> CatalogResult<Option<Product>> {
        // Match the title case-insensitively, or the slug in its stored
        // lowercase form
        let condition = Condition::any()
            .add(Expr::expr(Func::upper(Expr::col(product::Column::Title))).eq(term.to_uppercase()))
            .add(product::Column::Slug.eq(term.to_lowercase()));

        let Some(model) = product::Entity::find()
            .filter(condition)
            .one(self.base.db())
            .await
            .map_err(classify)?
        else {
            return Ok(None);
        };

        let images = model
            .find_related(product_image::Entity)
            .all(self.base.db())
            .await
            .map_err(classify)?;

        Ok(Some(attach_images(model, images)))
    }

    async fn replace(&self, product: Product) -> CatalogResult<Product> {
        let tx = self.base.db().begin().await.map_err(classify)?;

        let active_model: product::ActiveModel = (&product).into();
        active_model.update(&tx).await.map_err(classify)?;

        // Replace the image set wholesale; the domain model already holds
        // the desired final state
        product_image::Entity::delete_many()
            .filter(product_image::Column::ProductId.eq(product.id))
            .exec(&tx)
            .await
            .map_err(classify)?;

        if !product.images.is_empty() {
            let rows = product
                .images
                .iter()
                .map(|image| product_image::active_model_for(product.id, image));
            product_image::Entity::insert_many(rows)
                .exec(&tx)
                .await
                .map_err(classify)?;
        }

        tx.commit().await.map_err(classify)?;

        tracing::info!(product_id = %product.id, "Updated product");
        Ok(product)
    }

    async fn delete_by_id(&self, id: Uuid) -> CatalogResult<bool> {
        // Image rows go with the product via the ON DELETE CASCADE constraint
        let rows_affected = self.base.delete_by_id(id).await.map_err(classify)?;

        if rows_affected > 0 {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
