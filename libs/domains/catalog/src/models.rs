use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Target audience for a product
// No strum EnumString here: DeriveActiveEnum already emits TryFrom<&str>
// for string-backed enums, and a second impl would collide.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "gender")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    #[sea_orm(string_value = "men")]
    Men,
    #[sea_orm(string_value = "women")]
    Women,
    #[sea_orm(string_value = "kid")]
    Kid,
    #[default]
    #[sea_orm(string_value = "unisex")]
    Unisex,
}

/// Image attached to a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    /// Unique identifier
    pub id: Uuid,
    /// Image URL
    pub url: String,
}

impl ProductImage {
    /// Create a new image record for the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            url: url.into(),
        }
    }
}

/// Product entity - a catalog item with its image records
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier
    pub id: Uuid,
    /// Product title (unique)
    pub title: String,
    /// URL-friendly identifier derived from the title (unique)
    pub slug: String,
    /// Optional long description
    pub description: Option<String>,
    /// Price in the store currency
    pub price: f64,
    /// Units in stock
    pub stock: i32,
    /// Available sizes (e.g., "S", "M", "XL")
    pub sizes: Vec<String>,
    /// Target audience
    pub gender: Gender,
    /// Free-form tags for search and grouping
    pub tags: Vec<String>,
    /// Attached image records
    pub images: Vec<ProductImage>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Product with images flattened to their URLs
///
/// This is the list/creation representation: clients get plain URL strings
/// instead of nested image records.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductPlain {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub sizes: Vec<String>,
    pub gender: Gender,
    pub tags: Vec<String>,
    /// Image URLs without record metadata
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    /// Optional explicit slug; derived from the title when omitted
    pub slug: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub stock: i32,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Image URLs to attach
    #[serde(default)]
    pub images: Vec<String>,
}

/// DTO for updating an existing product
///
/// All fields are optional; omitted fields keep their stored values,
/// except `images` where omission clears the attached image records.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub sizes: Option<Vec<String>>,
    pub gender: Option<Gender>,
    pub tags: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

/// Query parameters for listing products
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct Pagination {
    /// Maximum number of products to return
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Number of products to skip
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    10
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

/// Normalize a title or slug into its canonical slug form:
/// lowercased, spaces replaced with underscores, apostrophes removed.
pub fn slugify(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .replace('\'', "")
}

impl Product {
    /// Create a new product from a CreateProduct DTO
    pub fn new(input: CreateProduct) -> Self {
        let now = Utc::now();
        let slug = match input.slug {
            Some(slug) => slugify(&slug),
            None => slugify(&input.title),
        };

        Self {
            id: Uuid::now_v7(),
            title: input.title,
            slug,
            description: input.description,
            price: input.price,
            stock: input.stock,
            sizes: input.sizes,
            gender: input.gender,
            tags: input.tags,
            images: input.images.into_iter().map(ProductImage::new).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply updates from an UpdateProduct DTO
    ///
    /// Only present fields overwrite stored values. The slug is recomputed
    /// when the payload carries a slug or a title (a supplied slug wins over
    /// one derived from the new title); otherwise the stored slug stays.
    /// Omitting `images` clears the attached records; supplying them replaces
    /// the set with fresh records.
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(title) = update.title {
            self.title = title;
            self.slug = slugify(&self.title);
        }
        if let Some(slug) = update.slug {
            self.slug = slugify(&slug);
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(sizes) = update.sizes {
            self.sizes = sizes;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        self.images = update
            .images
            .unwrap_or_default()
            .into_iter()
            .map(ProductImage::new)
            .collect();
        self.updated_at = Utc::now();
    }

    /// Flatten image records to their URLs
    pub fn into_plain(self) -> ProductPlain {
        ProductPlain {
            id: self.id,
            title: self.title,
            slug: self.slug,
            description: self.description,
            price: self.price,
            stock: self.stock,
            sizes: self.sizes,
            gender: self.gender,
            tags: self.tags,
            images: self.images.into_iter().map(|image| image.url).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_input(title: &str) -> CreateProduct {
        CreateProduct {
            title: title.to_string(),
            slug: None,
            description: None,
            price: 49.99,
            stock: 5,
            sizes: vec!["M".to_string(), "L".to_string()],
            gender: Gender::Men,
            tags: vec!["shirt".to_string()],
            images: vec!["http://img/1.jpg".to_string()],
        }
    }

    #[test]
    fn test_slugify_normalizes_title() {
        assert_eq!(slugify("Men's Raven Shirt"), "mens_raven_shirt");
        assert_eq!(slugify("  Plain Tee "), "plain_tee");
        assert_eq!(slugify("already_slugged"), "already_slugged");
    }

    #[test]
    fn test_new_derives_slug_from_title() {
        let product = Product::new(create_input("Men's Raven Shirt"));
        assert_eq!(product.slug, "mens_raven_shirt");
        assert_eq!(product.images.len(), 1);
        assert_eq!(product.images[0].url, "http://img/1.jpg");
    }

    #[test]
    fn test_new_normalizes_explicit_slug() {
        let mut input = create_input("Raven Shirt");
        input.slug = Some("Custom Slug's".to_string());
        let product = Product::new(input);
        assert_eq!(product.slug, "custom_slugs");
    }

    #[test]
    fn test_apply_update_recomputes_slug_from_title() {
        let mut product = Product::new(create_input("Old Title"));
        product.apply_update(UpdateProduct {
            title: Some("New Fancy Title".to_string()),
            ..Default::default()
        });
        assert_eq!(product.title, "New Fancy Title");
        assert_eq!(product.slug, "new_fancy_title");
    }

    #[test]
    fn test_apply_update_keeps_stored_slug_when_slug_and_title_omitted() {
        let mut input = create_input("Raven Shirt");
        input.slug = Some("limited_edition".to_string());
        let mut product = Product::new(input);
        assert_eq!(product.slug, "limited_edition");

        // A price-only update must not touch the explicit slug
        product.apply_update(UpdateProduct {
            price: Some(99.0),
            ..Default::default()
        });

        assert_eq!(product.slug, "limited_edition");
        assert_eq!(product.price, 99.0);
    }

    #[test]
    fn test_apply_update_supplied_slug_wins_over_title() {
        let mut product = Product::new(create_input("Old Title"));

        product.apply_update(UpdateProduct {
            title: Some("New Title".to_string()),
            slug: Some("Custom Slug".to_string()),
            ..Default::default()
        });

        assert_eq!(product.title, "New Title");
        assert_eq!(product.slug, "custom_slug");
    }

    #[test]
    fn test_apply_update_clears_images_when_omitted() {
        let mut product = Product::new(create_input("Raven Shirt"));
        assert_eq!(product.images.len(), 1);

        product.apply_update(UpdateProduct {
            price: Some(99.0),
            ..Default::default()
        });

        assert!(product.images.is_empty());
        assert_eq!(product.price, 99.0);
    }

    #[test]
    fn test_apply_update_replaces_images_when_supplied() {
        let mut product = Product::new(create_input("Raven Shirt"));
        let old_id = product.images[0].id;

        product.apply_update(UpdateProduct {
            images: Some(vec![
                "http://img/2.jpg".to_string(),
                "http://img/3.jpg".to_string(),
            ]),
            ..Default::default()
        });

        assert_eq!(product.images.len(), 2);
        assert!(product.images.iter().all(|image| image.id != old_id));
    }

    #[test]
    fn test_into_plain_flattens_urls() {
        let product = Product::new(create_input("Raven Shirt"));
        let plain = product.into_plain();
        assert_eq!(plain.images, vec!["http://img/1.jpg".to_string()]);
    }

    #[test]
    fn test_pagination_defaults() {
        let pagination: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(pagination.limit, 10);
        assert_eq!(pagination.offset, 0);
    }

    #[test]
    fn test_create_product_validation() {
        let mut input = create_input("");
        assert!(input.validate().is_err());

        input.title = "Valid".to_string();
        assert!(input.validate().is_ok());

        input.price = -1.0;
        assert!(input.validate().is_err());
    }
}
