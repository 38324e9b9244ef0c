//! Sea-ORM entities for the product catalog tables.

pub mod product;
pub mod product_image;
