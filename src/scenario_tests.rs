// src/scenario_tests.rs

// End-to-end flows against a real database. Run with
// `DATABASE_URL=... cargo test -- --ignored`.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use rust_xlsxwriter::Workbook;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    config::{AppState, Config},
    routes::build_router,
};

const BOUNDARY: &str = "tenderhub-test-boundary";

async fn app(pool: PgPool) -> Router {
    let upload_dir = std::env::temp_dir().join(format!("tenderhub-{}", Uuid::new_v4()));
    let upload_dir = upload_dir.to_string_lossy().into_owned();
    let config = Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some("scenario-secret".to_string()),
        "UPLOAD_DIR" => Some(upload_dir.clone()),
        _ => None,
    })
    .unwrap();

    let state = AppState::with_pool(pool, config);
    state
        .auth_service
        .ensure_admin("admin@example.com", "admin123")
        .await
        .unwrap();
    build_router(state)
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn multipart_file(uri: &str, token: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

type Row<'a> = (f64, &'a str, &'a str, f64);

fn workbook(rows: &[Row]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in ["number", "name", "unit", "quantity"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (i, (number, name, unit, quantity)) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_number(row, 0, *number).unwrap();
        sheet.write_string(row, 1, *name).unwrap();
        sheet.write_string(row, 2, *unit).unwrap();
        sheet.write_number(row, 3, *quantity).unwrap();
    }
    workbook.save_to_buffer().unwrap()
}

fn positions_workbook() -> Vec<u8> {
    workbook(&[(1.0, "A4 paper", "pack", 2.0), (2.0, "A3 paper", "pack", 1.0), (3.0, "Toner", "pcs", 1.0)])
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = call(
        app,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": email, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

fn id_of(value: &Value) -> Uuid {
    value["id"].as_str().unwrap().parse().unwrap()
}

/// Creates tender `number` with lot 1 and returns `(tender, lot)`.
async fn tender_with_lot(app: &Router, token: &str, number: &str) -> (Value, Value) {
    let (status, tender) = call(
        app,
        json_request(
            Method::POST,
            "/api/tenders",
            Some(token),
            json!({ "number": number, "title": "Stationery" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{tender}");

    let (status, lot) = call(
        app,
        json_request(
            Method::POST,
            "/api/lots",
            Some(token),
            json!({ "tenderId": tender["id"], "number": 1, "title": "Paper" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{lot}");
    (tender, lot)
}

async fn supplier(app: &Router, token: &str, name: &str) -> Value {
    let (status, supplier) = call(
        app,
        json_request(Method::POST, "/api/suppliers", Some(token), json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{supplier}");
    supplier
}

async fn count(pool: &PgPool, sql: &str, id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>(sql)
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn tender_to_comparison_flow(pool: PgPool) {
    let app = app(pool).await;
    let token = login(&app, "admin@example.com", "admin123").await;

    let (status, tender) = call(
        &app,
        json_request(
            Method::POST,
            "/api/tenders",
            Some(&token),
            json!({ "number": "T-001", "title": "Paper supply" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{tender}");
    assert_eq!(tender["status"], "Draft");
    let tender_id = tender["id"].as_str().unwrap().to_string();

    let (status, lot) = call(
        &app,
        json_request(
            Method::POST,
            "/api/lots",
            Some(&token),
            json!({ "tenderId": tender_id, "number": 1, "title": "Paper" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{lot}");
    let lot_id = lot["id"].as_str().unwrap().to_string();

    let (status, imported) = call(
        &app,
        multipart_file(
            &format!("/api/positions/import/{lot_id}"),
            &token,
            "positions.xlsx",
            &positions_workbook(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{imported}");
    assert_eq!(imported["count"], 3);
    let first_position = imported["positions"][0]["id"].as_str().unwrap().to_string();

    let mut quote_ids = Vec::new();
    for (name, unit_price) in [("Paper Co", 50), ("Cheap Paper", 45)] {
        let (status, supplier) = call(
            &app,
            json_request(Method::POST, "/api/suppliers", Some(&token), json!({ "name": name })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{supplier}");

        let (status, quote) = call(
            &app,
            json_request(
                Method::POST,
                "/api/quotes",
                Some(&token),
                json!({
                    "tenderId": tender_id,
                    "lotId": lot_id,
                    "supplierId": supplier["id"],
                    "positions": [
                        { "positionId": first_position, "unitPrice": unit_price, "quantity": 2 }
                    ]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{quote}");
        assert_eq!(quote["totalAmount"], json!(f64::from(unit_price * 2)));
        quote_ids.push(quote["id"].as_str().unwrap().to_string());
    }

    // Drafts are not comparable yet
    let (_, matrix) = call(&app, get(&format!("/api/comparison/lot/{lot_id}"), &token)).await;
    assert_eq!(matrix["quotes"].as_array().unwrap().len(), 0);

    for id in &quote_ids {
        let (status, submitted) = call(
            &app,
            json_request(Method::POST, &format!("/api/quotes/{id}/submit"), Some(&token), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{submitted}");
        assert_eq!(submitted["status"], "Submitted");
    }

    let (status, matrix) = call(&app, get(&format!("/api/comparison/lot/{lot_id}"), &token)).await;
    assert_eq!(status, StatusCode::OK, "{matrix}");
    let totals: Vec<f64> = matrix["quotes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["totalAmount"].as_f64().unwrap())
        .collect();
    assert_eq!(totals, [90.0, 100.0]);
    assert_eq!(matrix["comparison"].as_array().unwrap().len(), 3);
    assert_eq!(matrix["comparison"][0]["quotes"][0]["supplierName"], "Cheap Paper");
    assert!(matrix["comparison"][1]["quotes"][0]["unitPrice"].is_null());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn users_without_a_tender_role_are_forbidden(pool: PgPool) {
    let app = app(pool).await;
    let admin = login(&app, "admin@example.com", "admin123").await;

    let (status, _) = call(
        &app,
        json_request(
            Method::POST,
            "/api/auth/register",
            Some(&admin),
            json!({
                "email": "viewer@example.com",
                "password": "viewer123",
                "fullName": "Viewer",
                "role": "viewer"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, tender) = call(
        &app,
        json_request(
            Method::POST,
            "/api/tenders",
            Some(&admin),
            json!({ "number": "T-002", "title": "Chairs" }),
        ),
    )
    .await;
    let tender_id = tender["id"].as_str().unwrap().to_string();

    let viewer = login(&app, "viewer@example.com", "viewer123").await;
    let (status, body) = call(&app, get(&format!("/api/tenders/{tender_id}"), &viewer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["statusCode"], 403);

    let (status, listed) = call(&app, get("/api/tenders", &viewer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 0);

    let viewer_id = {
        let (_, me) = call(&app, get("/api/auth/me", &viewer)).await;
        me["id"].as_str().unwrap().to_string()
    };
    let (status, _) = call(
        &app,
        json_request(
            Method::POST,
            &format!("/api/tenders/{tender_id}/roles"),
            Some(&admin),
            json!({ "userId": viewer_id, "role": "viewer" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Read access now, but updates still need manager
    let (status, _) = call(&app, get(&format!("/api/tenders/{tender_id}"), &viewer)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/tenders/{tender_id}"),
            Some(&viewer),
            json!({ "title": "Office chairs" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn failed_quote_line_leaves_no_quote_behind(pool: PgPool) {
    let app = app(pool.clone()).await;
    let token = login(&app, "admin@example.com", "admin123").await;
    let (tender, lot) = tender_with_lot(&app, &token, "T-010").await;
    let lot_id = id_of(&lot);

    let (status, imported) = call(
        &app,
        multipart_file(
            &format!("/api/positions/import/{lot_id}"),
            &token,
            "positions.xlsx",
            &positions_workbook(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{imported}");
    let supplier = supplier(&app, &token, "Paper Co").await;

    // Last line references a position that does not exist
    let (status, body) = call(
        &app,
        json_request(
            Method::POST,
            "/api/quotes",
            Some(&token),
            json!({
                "tenderId": tender["id"],
                "lotId": lot_id,
                "supplierId": supplier["id"],
                "positions": [
                    { "positionId": imported["positions"][0]["id"], "unitPrice": 10, "quantity": 2 },
                    { "positionId": imported["positions"][1]["id"], "unitPrice": 5, "quantity": 1 },
                    { "positionId": Uuid::new_v4(), "unitPrice": 1, "quantity": 1 }
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"]["statusCode"], 400);

    // Totals too large for a decimal are refused before anything is written
    let (status, body) = call(
        &app,
        json_request(
            Method::POST,
            "/api/quotes",
            Some(&token),
            json!({
                "tenderId": tender["id"],
                "lotId": lot_id,
                "supplierId": supplier["id"],
                "positions": [
                    { "positionId": imported["positions"][0]["id"], "unitPrice": 1e20, "quantity": 1e20 }
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"]["message"], "Line item total is out of range");

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM quotes WHERE lot_id = $1", lot_id).await, 0);
    assert_eq!(
        count(
            &pool,
            "SELECT COUNT(*) FROM quote_positions qp JOIN positions p ON p.id = qp.position_id WHERE p.lot_id = $1",
            lot_id,
        )
        .await,
        0
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn failed_import_row_leaves_the_lot_empty(pool: PgPool) {
    let app = app(pool.clone()).await;
    let token = login(&app, "admin@example.com", "admin123").await;
    let (_, lot) = tender_with_lot(&app, &token, "T-011").await;
    let lot_id = id_of(&lot);

    sqlx::query(
        r#"
        CREATE FUNCTION reject_broken_position() RETURNS trigger AS $$
        BEGIN
            IF NEW.name = 'Broken row' THEN
                RAISE EXCEPTION 'rejected position %', NEW.number;
            END IF;
            RETURN NEW;
        END
        $$ LANGUAGE plpgsql
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER reject_broken_position BEFORE INSERT ON positions \
         FOR EACH ROW EXECUTE FUNCTION reject_broken_position()",
    )
    .execute(&pool)
    .await
    .unwrap();

    let rows = workbook(&[
        (1.0, "A4 paper", "pack", 2.0),
        (2.0, "A3 paper", "pack", 1.0),
        (3.0, "Broken row", "pcs", 1.0),
    ]);
    let (status, body) = call(
        &app,
        multipart_file(&format!("/api/positions/import/{lot_id}"), &token, "positions.xlsx", &rows),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{body}");

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM positions WHERE lot_id = $1", lot_id).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn lot_numbers_are_unique_within_a_tender(pool: PgPool) {
    let app = app(pool).await;
    let token = login(&app, "admin@example.com", "admin123").await;
    let (tender, _) = tender_with_lot(&app, &token, "T-012").await;

    let (status, body) = call(
        &app,
        json_request(
            Method::POST,
            "/api/lots",
            Some(&token),
            json!({ "tenderId": tender["id"], "number": 1, "title": "Paper again" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["error"]["statusCode"], 409);

    // The same number is free in another tender
    let (other, _) = tender_with_lot(&app, &token, "T-013").await;
    assert_ne!(other["id"], tender["id"]);

    let (status, lot) = call(
        &app,
        json_request(
            Method::POST,
            "/api/lots",
            Some(&token),
            json!({ "tenderId": tender["id"], "number": 2, "title": "Toner" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{lot}");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn replacing_line_items_recomputes_the_total(pool: PgPool) {
    let app = app(pool.clone()).await;
    let token = login(&app, "admin@example.com", "admin123").await;
    let (tender, lot) = tender_with_lot(&app, &token, "T-014").await;
    let lot_id = id_of(&lot);

    let (_, imported) = call(
        &app,
        multipart_file(
            &format!("/api/positions/import/{lot_id}"),
            &token,
            "positions.xlsx",
            &positions_workbook(),
        ),
    )
    .await;
    let positions = imported["positions"].as_array().unwrap().clone();
    let supplier = supplier(&app, &token, "Paper Co").await;

    let (status, quote) = call(
        &app,
        json_request(
            Method::POST,
            "/api/quotes",
            Some(&token),
            json!({
                "tenderId": tender["id"],
                "lotId": lot_id,
                "supplierId": supplier["id"],
                "positions": [{ "positionId": positions[0]["id"], "unitPrice": 50, "quantity": 2 }]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{quote}");
    assert_eq!(quote["totalAmount"], json!(100.0));
    let quote_id = id_of(&quote);

    let (status, replaced) = call(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/quotes/{quote_id}/positions"),
            Some(&token),
            json!({
                "positions": [
                    { "positionId": positions[0]["id"], "unitPrice": 10, "quantity": 3 },
                    { "positionId": positions[2]["id"], "unitPrice": 5, "quantity": 1 }
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{replaced}");
    assert_eq!(replaced["totalAmount"], json!(35.0));
    assert_eq!(replaced["positions"].as_array().unwrap().len(), 2);

    let (_, fetched) = call(&app, get(&format!("/api/quotes/{quote_id}"), &token)).await;
    assert_eq!(fetched["totalAmount"], json!(35.0));
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM quote_positions WHERE quote_id = $1", quote_id).await,
        2
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn named_manager_gets_the_manager_role_instead_of_the_creator(pool: PgPool) {
    let app = app(pool).await;
    let admin = login(&app, "admin@example.com", "admin123").await;

    let (status, manager) = call(
        &app,
        json_request(
            Method::POST,
            "/api/auth/register",
            Some(&admin),
            json!({
                "email": "buyer@example.com",
                "password": "buyer123",
                "fullName": "Buyer",
                "role": "manager"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{manager}");

    let (status, tender) = call(
        &app,
        json_request(
            Method::POST,
            "/api/tenders",
            Some(&admin),
            json!({ "number": "T-020", "title": "Furniture", "managerId": manager["id"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{tender}");
    let tender_id = id_of(&tender);

    let (status, roles) = call(&app, get(&format!("/api/tenders/{tender_id}/roles"), &admin)).await;
    assert_eq!(status, StatusCode::OK, "{roles}");
    let roles = roles.as_array().unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0]["userId"], manager["id"]);
    assert_eq!(roles[0]["role"], "manager");

    let buyer = login(&app, "buyer@example.com", "buyer123").await;
    let (status, updated) = call(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/tenders/{tender_id}"),
            Some(&buyer),
            json!({ "title": "Office furniture" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["title"], "Office furniture");
}
