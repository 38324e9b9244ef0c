use crate::models::Gender;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sea-ORM Entity for the products table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub sizes: Json,
    pub gender: Gender,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_image::Entity")]
    ProductImages,
}

impl Related<super::product_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductImages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// Conversion from Sea-ORM Model to domain Product.
// Images live in their own table; the repository attaches them after loading.
impl From<Model> for crate::models::Product {
    fn from(model: Model) -> Self {
        let sizes: Vec<String> = serde_json::from_value(model.sizes.clone()).unwrap_or_default();
        let tags: Vec<String> = serde_json::from_value(model.tags.clone()).unwrap_or_default();

        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            description: model.description,
            price: model.price,
            stock: model.stock,
            sizes,
            gender: model.gender,
            tags,
            images: Vec::new(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

// Conversion from domain Product to Sea-ORM ActiveModel (all columns set).
// Used for both inserts and full-row updates.
impl From<&crate::models::Product> for ActiveModel {
    fn from(product: &crate::models::Product) -> Self {
        let sizes_json = serde_json::to_value(&product.sizes).expect("Failed to serialize sizes");
        let tags_json = serde_json::to_value(&product.tags).expect("Failed to serialize tags");

        ActiveModel {
            id: Set(product.id),
            title: Set(product.title.clone()),
            slug: Set(product.slug.clone()),
            description: Set(product.description.clone()),
            price: Set(product.price),
            stock: Set(product.stock),
            sizes: Set(sizes_json),
            gender: Set(product.gender),
            tags: Set(tags_json),
            created_at: Set(product.created_at.into()),
            updated_at: Set(product.updated_at.into()),
        }
    }
}
