//! Handler tests for the Catalog domain
//!
//! These tests verify that HTTP handlers work correctly:
//! - Request deserialization (JSON → Rust structs)
//! - Response serialization (Rust structs → JSON)
//! - HTTP status codes
//! - Error responses
//!
//! Unlike E2E tests, these test ONLY the catalog domain handlers,
//! not the full application with routing, middleware, etc.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_catalog::*;
use http_body_util::BodyExt;
use serde_json::json;
use test_utils::{TestDatabase, TestDataBuilder};
use tower::ServiceExt; // For oneshot()

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_create_product_handler_returns_201() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let service = ProductCatalogService::new(repo);
    let app = handlers::router(service);

    let builder = TestDataBuilder::from_test_name("handler_create_201");
    let title = builder.name("product", "test");

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "title": title,
                "description": "Handler test",
                "price": 49.99,
                "stock": 5,
                "sizes": ["M", "L"],
                "gender": "men",
                "tags": ["shirt"],
                "images": ["http://img/front.jpg", "http://img/back.jpg"]
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let product: ProductPlain = json_body(response.into_body()).await;
    assert_eq!(product.title, title);
    assert_eq!(product.gender, Gender::Men);
    assert_eq!(
        product.images,
        vec![
            "http://img/front.jpg".to_string(),
            "http://img/back.jpg".to_string()
        ]
    );
}

#[tokio::test]
async fn test_create_product_handler_validates_input() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let service = ProductCatalogService::new(repo);
    let app = handlers::router(service);

    // Invalid title (empty string)
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "title": "",
                "price": 10.0
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_product_handler_returns_409_for_duplicate() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let service = ProductCatalogService::new(repo);
    let builder = TestDataBuilder::from_test_name("handler_duplicate");

    let title = builder.name("product", "dup");

    let input = CreateProduct {
        title: title.clone(),
        slug: None,
        description: None,
        price: 10.0,
        stock: 1,
        sizes: vec![],
        gender: Gender::Unisex,
        tags: vec![],
        images: vec![],
    };
    service.create(input).await.unwrap();

    let app = handlers::router(service);

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "title": title,
                "price": 10.0
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_get_product_handler_returns_200() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let service = ProductCatalogService::new(repo);
    let builder = TestDataBuilder::from_test_name("handler_get_200");

    let title = builder.name("product", "get-test");
    let created = service
        .create(CreateProduct {
            title: title.clone(),
            slug: None,
            description: None,
            price: 10.0,
            stock: 1,
            sizes: vec![],
            gender: Gender::Unisex,
            tags: vec![],
            images: vec![],
        })
        .await
        .unwrap();

    let app = handlers::router(service);

    // Lookup by id
    let request = Request::builder()
        .method("GET")
        .uri(format!("/{}", created.id))
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let product: ProductPlain = json_body(response.into_body()).await;
    assert_eq!(product.id, created.id);
    assert_eq!(product.title, title);

    // Lookup by slug
    let request = Request::builder()
        .method("GET")
        .uri(format!("/{}", created.slug))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_product_handler_returns_404_for_missing() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let service = ProductCatalogService::new(repo);
    let app = handlers::router(service);

    let request = Request::builder()
        .method("GET")
        .uri("/no_such_product")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_products_handler_with_pagination() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let service = ProductCatalogService::new(repo);
    let builder = TestDataBuilder::from_test_name("handler_list");

    for i in 0..3 {
        service
            .create(CreateProduct {
                title: builder.name("product", &format!("p{}", i)),
                slug: None,
                description: None,
                price: 10.0,
                stock: 1,
                sizes: vec![],
                gender: Gender::Unisex,
                tags: vec![],
                images: vec![],
            })
            .await
            .unwrap();
    }

    let app = handlers::router(service);

    let request = Request::builder()
        .method("GET")
        .uri("/?limit=2&offset=0")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let products: Vec<ProductPlain> = json_body(response.into_body()).await;
    assert_eq!(products.len(), 2);
    // Newest first
    assert_eq!(products[0].title, builder.name("product", "p2"));
}

#[tokio::test]
async fn test_update_product_handler_returns_200() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let service = ProductCatalogService::new(repo);
    let builder = TestDataBuilder::from_test_name("handler_update");

    let created = service
        .create(CreateProduct {
            title: builder.name("product", "before"),
            slug: None,
            description: None,
            price: 10.0,
            stock: 1,
            sizes: vec![],
            gender: Gender::Unisex,
            tags: vec![],
            images: vec![],
        })
        .await
        .unwrap();

    let app = handlers::router(service);

    let new_title = builder.name("product", "after");
    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/{}", created.id))
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "title": new_title,
                "stock": 42
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let product: Product = json_body(response.into_body()).await;
    assert_eq!(product.title, new_title);
    assert_eq!(product.stock, 42);
}

#[tokio::test]
async fn test_update_product_handler_rejects_invalid_uuid() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let service = ProductCatalogService::new(repo);
    let app = handlers::router(service);

    let request = Request::builder()
        .method("PATCH")
        .uri("/not-a-uuid")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&json!({})).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_product_handler_returns_snapshot() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let service = ProductCatalogService::new(repo);
    let builder = TestDataBuilder::from_test_name("handler_delete");

    let title = builder.name("product", "delete-test");
    let created = service
        .create(CreateProduct {
            title: title.clone(),
            slug: None,
            description: None,
            price: 10.0,
            stock: 1,
            sizes: vec![],
            gender: Gender::Unisex,
            tags: vec![],
            images: vec![],
        })
        .await
        .unwrap();

    let app = handlers::router(service);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/{}", created.id))
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let product: Product = json_body(response.into_body()).await;
    assert_eq!(product.id, created.id);
    assert_eq!(product.title, title);

    // Deleting again yields 404
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/{}", created.id))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
