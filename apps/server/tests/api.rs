//! Router tests against an in-memory database.

use atelier_db::{Database, DbConfig};
use atelier_server::{app, AppState, ServerConfig};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    app(AppState::new(db, ServerConfig::default()).shared())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn create_product(app: &Router, barcode: &str, name: &str, price: i64, stock: i64) -> Value {
    let (status, product) = send(
        app,
        "POST",
        "/api/products",
        Some(json!({
            "barcode": barcode,
            "name": name,
            "category": "Tops",
            "size": "M",
            "price": price,
            "stock": stock,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{product}");
    product
}

async fn create_discount(app: &Router, active: bool) -> Value {
    let (status, discount) = send(
        app,
        "POST",
        "/api/discounts",
        Some(json!({ "name": "Ten Off", "type": "percentage", "value": 10, "active": active })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{discount}");
    discount
}

#[tokio::test]
async fn health_reports_database() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn barcode_lookup_is_exact() {
    let app = test_app().await;
    create_product(&app, "LT-M-BLK", "Black Linen Tee", 249000, 4).await;

    let (status, product) = send(&app, "GET", "/api/products/barcode/LT-M-BLK", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["name"], "Black Linen Tee");
    assert_eq!(product["price"], 249000);

    let (status, body) = send(&app, "GET", "/api/products/barcode/LT-M", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn duplicate_barcode_conflicts() {
    let app = test_app().await;
    create_product(&app, "1001", "Linen Tee", 250, 4).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/products",
        Some(json!({ "barcode": "1001", "name": "Other Tee", "price": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn invalid_product_is_rejected() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/products",
        Some(json!({ "barcode": "1001", "name": "", "price": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(&app, "POST", "/api/products", Some(json!({ "barcode": 7 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn terminal_checkout_flow() {
    let app = test_app().await;
    let tee = create_product(&app, "1001", "Linen Tee", 250, 5).await;
    create_product(&app, "1002", "Silk Scarf", 500, 5).await;
    let discount = create_discount(&app, true).await;

    let cart = "/api/terminals/till-1/cart";
    send(&app, "POST", &format!("{cart}/scan"), Some(json!({ "barcode": "1001" }))).await;
    let (_, view) = send(&app, "POST", &format!("{cart}/scan"), Some(json!({ "barcode": "1001" }))).await;
    assert_eq!(view["lines"].as_array().unwrap().len(), 1);
    assert_eq!(view["lines"][0]["quantity"], 2);

    let (status, view) =
        send(&app, "POST", &format!("{cart}/scan"), Some(json!({ "barcode": "1002" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["subtotal"], 1000);

    let (status, view) = send(
        &app,
        "PUT",
        &format!("{cart}/discount"),
        Some(json!({ "discountId": discount["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["discountAmount"], 100);
    assert_eq!(view["total"], 900);

    let (status, body) = send(
        &app,
        "POST",
        "/api/terminals/till-1/checkout",
        Some(json!({ "paymentMethod": "cash", "amountPaid": 1000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["sale"]["receiptNumber"], "ATL000001");
    assert_eq!(body["sale"]["total"], 900);
    assert_eq!(body["sale"]["change"], 100);
    assert!(body["receipt"].as_str().unwrap().contains("ATL000001"));

    let (_, view) = send(&app, "GET", cart, None).await;
    assert_eq!(view["lines"].as_array().unwrap().len(), 0);

    let (_, product) = send(&app, "GET", &format!("/api/products/{}", tee["id"].as_str().unwrap()), None).await;
    assert_eq!(product["stock"], 3);
}

#[tokio::test]
async fn cart_errors_map_to_statuses() {
    let app = test_app().await;
    create_product(&app, "1001", "Linen Tee", 250, 1).await;
    let cart = "/api/terminals/till-2/cart";

    let (status, body) =
        send(&app, "POST", &format!("{cart}/scan"), Some(json!({ "barcode": "9999" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, view) =
        send(&app, "POST", &format!("{cart}/scan"), Some(json!({ "barcode": "1001" }))).await;
    assert_eq!(status, StatusCode::OK);
    let line_id = view["lines"][0]["id"].as_str().unwrap().to_string();

    let (status, body) =
        send(&app, "POST", &format!("{cart}/scan"), Some(json!({ "barcode": "1001" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("{cart}/lines/{line_id}"),
        Some(json!({ "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/terminals/till-2/checkout",
        Some(json!({ "paymentMethod": "cash", "amountPaid": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "PAYMENT_ERROR");

    // the failed checkout kept the cart
    let (_, view) = send(&app, "GET", cart, None).await;
    assert_eq!(view["lines"].as_array().unwrap().len(), 1);

    let (status, view) = send(&app, "DELETE", &format!("{cart}/lines/{line_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["lines"].as_array().unwrap().len(), 0);

    let (status, body) = send(
        &app,
        "POST",
        "/api/terminals/till-2/checkout",
        Some(json!({ "paymentMethod": "card" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn inactive_discount_cannot_be_selected() {
    let app = test_app().await;
    let discount = create_discount(&app, false).await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/terminals/till-1/cart/discount",
        Some(json!({ "discountId": discount["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (_, active) = send(&app, "GET", "/api/discounts", None).await;
    assert_eq!(active.as_array().unwrap().len(), 0);
    let (_, all) = send(&app, "GET", "/api/discounts/all", None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn ad_hoc_discount_amount_is_recomputed() {
    let app = test_app().await;
    let shirt = create_product(&app, "1001", "Linen Shirt", 500, 5).await;

    let (status, sale) = send(
        &app,
        "POST",
        "/api/sales",
        Some(json!({
            "items": [{ "product": shirt["id"], "name": "Linen Shirt", "barcode": "1001",
                        "quantity": 2, "price": 500, "total": 1000 }],
            "subtotal": 1000,
            "discount": { "name": "Staff", "type": "percentage", "value": 10, "amount": 900 },
            "total": 100,
            "paymentMethod": "cash",
            "amountPaid": 1000,
            "change": 900,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{sale}");
    assert_eq!(sale["discount"]["name"], "Staff");
    assert_eq!(sale["discount"]["type"], "percentage");
    assert_eq!(sale["discount"]["value"], 10);
    assert_eq!(sale["discount"]["amount"], 100);
    assert_eq!(sale["subtotal"], 1000);
    assert_eq!(sale["total"], 900);
    assert_eq!(sale["change"], 100);

    let (status, body) = send(
        &app,
        "POST",
        "/api/sales",
        Some(json!({
            "items": [{ "product": shirt["id"], "quantity": 1 }],
            "discount": { "name": "Everything", "type": "percentage", "value": 500 },
            "paymentMethod": "card",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, product) = send(&app, "GET", &format!("/api/products/{}", shirt["id"].as_str().unwrap()), None).await;
    assert_eq!(product["stock"], 3);
}

#[tokio::test]
async fn direct_sale_commit_and_receipt() {
    let app = test_app().await;
    let tee = create_product(&app, "1001", "Linen Tee", 250, 1).await;

    let request = |quantity: i64| {
        json!({
            "items": [{ "product": tee["id"], "name": "Linen Tee", "barcode": "1001", "quantity": quantity }],
            "paymentMethod": "mobile",
            "amountPaid": 0,
        })
    };

    let (status, body) = send(&app, "POST", "/api/sales", Some(request(2))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");

    let (status, sale) = send(&app, "POST", "/api/sales", Some(request(1))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sale["receiptNumber"], "ATL000001");
    assert_eq!(sale["amountPaid"], 250);
    assert_eq!(sale["change"], 0);

    let (status, fetched) = send(&app, "GET", "/api/sales/ATL000001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], sale["id"]);
    assert_eq!(fetched["items"], sale["items"]);
    assert_eq!(fetched["total"], 250);

    let (status, receipt) = send(&app, "GET", "/api/sales/ATL000001/receipt", None).await;
    assert_eq!(status, StatusCode::OK);
    let text = receipt.as_str().unwrap();
    assert!(text.contains("Atelier Fashion"));
    assert!(text.contains("MOBILE"));

    let (_, sales) = send(&app, "GET", "/api/sales", None).await;
    assert_eq!(sales.as_array().unwrap().len(), 1);
    let (status, sales) = send(&app, "GET", "/api/sales?limit=0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sales.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/api/sales/ATL000042", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sold_product_cannot_be_deleted() {
    let app = test_app().await;
    let tee = create_product(&app, "1001", "Linen Tee", 250, 3).await;
    let unsold = create_product(&app, "1002", "Silk Scarf", 500, 3).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/sales",
        Some(json!({
            "items": [{ "product": tee["id"], "quantity": 1 }],
            "paymentMethod": "card",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let path = format!("/api/products/{}", tee["id"].as_str().unwrap());
    let (status, body) = send(&app, "DELETE", &path, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let path = format!("/api/products/{}", unsold["id"].as_str().unwrap());
    let (status, _) = send(&app, "DELETE", &path, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn supplier_crud() {
    let app = test_app().await;

    let (status, supplier) = send(
        &app,
        "POST",
        "/api/suppliers",
        Some(json!({ "name": "Kandy Silk House", "phone": "+94 81 222 3344" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let path = format!("/api/suppliers/{}", supplier["id"].as_str().unwrap());
    let (status, updated) = send(
        &app,
        "PUT",
        &path,
        Some(json!({ "name": "Kandy Silk House Ltd", "phone": "+94 81 222 3344" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Kandy Silk House Ltd");

    let (status, _) = send(&app, "DELETE", &path, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, list) = send(&app, "GET", "/api/suppliers", None).await;
    assert_eq!(list.as_array().unwrap().len(), 0);
}
