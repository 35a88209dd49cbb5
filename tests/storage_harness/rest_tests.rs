//! REST integration test macro for storage backends.
//!
//! The `rest_integration_tests!` macro drives the real router through HTTP
//! round-trips: JSON → handler → storage service → envelope → JSON.

/// Generate a REST integration test suite for a storage backend.
///
/// `$invoices` and `$lines` must produce `InvoiceService` and
/// `InvoiceLineService` implementations backed by empty tables.
///
/// # Generated Tests
///
/// ## Invoices
/// - create with each valid status, create with invalid, non-string or missing status
/// - untyped column values: numbers for text columns, unparseable amounts and dates
/// - get / get unknown id / get non-numeric id
/// - list ordering and count
/// - patch subset, patch empty body, patch invalid status, patch rounding, patch unknown id
/// - put full replace, put with missing required column
/// - delete one, delete all
///
/// ## Invoice lines
/// - create computes line_total, get unknown id, list, admin table route
#[macro_export]
macro_rules! rest_integration_tests {
    ($invoices:expr, $lines:expr) => {
        mod rest_integration_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum_test::TestServer;
            use invoice_gateway::server::ServerBuilder;
            use serde_json::{Value, json};

            async fn make_server() -> TestServer {
                let router = ServerBuilder::new()
                    .with_invoice_service($invoices)
                    .with_invoice_line_service($lines)
                    .build()
                    .unwrap();
                TestServer::try_new(router).unwrap()
            }

            async fn create_invoice(server: &TestServer, invoice_number: &str) -> Value {
                let response = server
                    .post("/api/invoices")
                    .json(&sample_invoice_json(invoice_number))
                    .await;
                response.assert_status(StatusCode::CREATED);
                response.json::<Value>()["data"].clone()
            }

            // ==============================================================
            // Create
            // ==============================================================

            #[tokio::test]
            async fn test_rest_create_matches_documented_example() {
                let server = make_server().await;

                let response = server
                    .post("/api/invoices")
                    .json(&json!({
                        "supplier_id": "SUP1",
                        "invoice_number": "INV-100",
                        "invoice_date": "2024-01-01",
                        "amount": 100.50,
                        "currency_code": "USD",
                        "status": "P",
                        "created_by": "alice"
                    }))
                    .await;

                response.assert_status(StatusCode::CREATED);
                let body: Value = response.json();
                assert_eq!(body["success"], true);
                assert_eq!(body["message"], "Invoice created successfully");
                assert_eq!(body["data"]["status"], "P");
                assert_eq!(body["data"]["amount"], "100.50");
                assert_eq!(body["data"]["invoice_date"], "2024-01-01");
                assert!(body["data"]["invoice_id"].as_i64().is_some());
                assert!(body["data"]["created_at"].as_str().is_some());
                assert_eq!(body["data"]["created_at"], body["data"]["updated_at"]);
            }

            #[tokio::test]
            async fn test_rest_create_each_valid_status() {
                let server = make_server().await;

                for status in ["S", "P", "E"] {
                    let mut body = sample_invoice_json(&format!("INV-{status}"));
                    body["status"] = json!(status);

                    let response = server.post("/api/invoices").json(&body).await;
                    response.assert_status(StatusCode::CREATED);
                    assert_eq!(response.json::<Value>()["data"]["status"], status);
                }

                let list: Value = server.get("/api/invoices").await.json();
                assert_eq!(list["count"], 3);
            }

            #[tokio::test]
            async fn test_rest_create_invalid_status_persists_nothing() {
                let server = make_server().await;
                let mut body = sample_invoice_json("INV-X");
                body["status"] = json!("X");

                let response = server.post("/api/invoices").json(&body).await;
                response.assert_status(StatusCode::BAD_REQUEST);
                response.assert_json(&json!({
                    "success": false,
                    "error": "Invalid status. Allowed values are S, P, E"
                }));

                let list: Value = server.get("/api/invoices").await.json();
                assert_eq!(list["data"], json!([]));
                assert_eq!(list["count"], 0);
            }

            #[tokio::test]
            async fn test_rest_create_missing_status_is_rejected() {
                let server = make_server().await;
                let mut body = sample_invoice_json("INV-1");
                body.as_object_mut().unwrap().remove("status");

                let response = server.post("/api/invoices").json(&body).await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(response.json::<Value>()["success"], false);
            }

            #[tokio::test]
            async fn test_rest_create_non_string_status_is_invalid_status() {
                let server = make_server().await;

                for status in [json!(1), json!(false), json!(["P"])] {
                    let mut body = sample_invoice_json("INV-1");
                    body["status"] = status;

                    let response = server.post("/api/invoices").json(&body).await;
                    response.assert_status(StatusCode::BAD_REQUEST);
                    response.assert_json(&json!({
                        "success": false,
                        "error": "Invalid status. Allowed values are S, P, E"
                    }));
                }

                let list: Value = server.get("/api/invoices").await.json();
                assert_eq!(list["count"], 0);
            }

            #[tokio::test]
            async fn test_rest_create_accepts_numbers_for_text_columns() {
                let server = make_server().await;
                let mut body = sample_invoice_json("INV-1");
                body["supplier_id"] = json!(123);
                body["invoice_number"] = json!(4711);
                body["amount"] = json!("99.9");

                let response = server.post("/api/invoices").json(&body).await;
                response.assert_status(StatusCode::CREATED);
                let data = &response.json::<Value>()["data"];
                assert_eq!(data["supplier_id"], "123");
                assert_eq!(data["invoice_number"], "4711");
                assert_eq!(data["amount"], "99.90");
            }

            #[tokio::test]
            async fn test_rest_create_unparseable_amount_is_500() {
                let server = make_server().await;
                let mut body = sample_invoice_json("INV-1");
                body["amount"] = json!("abc");

                let response = server.post("/api/invoices").json(&body).await;
                response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
                response.assert_json(&json!({
                    "success": false,
                    "error": "invalid input syntax for type numeric: \"abc\""
                }));

                let list: Value = server.get("/api/invoices").await.json();
                assert_eq!(list["count"], 0);
            }

            #[tokio::test]
            async fn test_rest_create_unparseable_date_is_500() {
                let server = make_server().await;
                let mut body = sample_invoice_json("INV-1");
                body["invoice_date"] = json!(true);

                let response = server.post("/api/invoices").json(&body).await;
                response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(
                    response.json::<Value>()["error"],
                    "invalid input syntax for type date: \"true\""
                );
            }

            #[tokio::test]
            async fn test_rest_create_missing_required_field_is_500() {
                let server = make_server().await;
                let mut body = sample_invoice_json("INV-1");
                body.as_object_mut().unwrap().remove("currency_code");

                let response = server.post("/api/invoices").json(&body).await;
                response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
                let body: Value = response.json();
                assert_eq!(body["success"], false);
                assert!(
                    body["error"].as_str().unwrap().contains("currency_code"),
                    "got: {body}"
                );
            }

            // ==============================================================
            // Read
            // ==============================================================

            #[tokio::test]
            async fn test_rest_get_existing() {
                let server = make_server().await;
                let created = create_invoice(&server, "INV-1").await;
                let id = created["invoice_id"].as_i64().unwrap();

                let response = server.get(&format!("/api/invoices/{id}")).await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["success"], true);
                assert_eq!(body["data"], created);
            }

            #[tokio::test]
            async fn test_rest_get_unknown_is_404() {
                let server = make_server().await;

                let response = server.get("/api/invoices/999999").await;
                response.assert_status_not_found();
                response.assert_json(&json!({
                    "success": false,
                    "message": "Invoice not found"
                }));
            }

            #[tokio::test]
            async fn test_rest_get_non_numeric_id_is_500() {
                let server = make_server().await;

                let response = server.get("/api/invoices/abc").await;
                response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
                response.assert_json(&json!({
                    "success": false,
                    "error": "invalid input syntax for type bigint: \"abc\""
                }));
            }

            #[tokio::test]
            async fn test_rest_list_ascending_identity() {
                let server = make_server().await;
                for n in 1..=3 {
                    create_invoice(&server, &format!("INV-{n}")).await;
                }

                let body: Value = server.get("/api/invoices").await.json();
                assert_eq!(body["count"], 3);
                let rows = body["data"].as_array().unwrap();
                let ids: Vec<i64> = rows.iter().map(|r| r["invoice_id"].as_i64().unwrap()).collect();
                let mut sorted = ids.clone();
                sorted.sort();
                assert_eq!(ids, sorted);
                let numbers: Vec<&str> =
                    rows.iter().map(|r| r["invoice_number"].as_str().unwrap()).collect();
                assert_eq!(numbers, vec!["INV-1", "INV-2", "INV-3"]);
            }

            // ==============================================================
            // Patch
            // ==============================================================

            #[tokio::test]
            async fn test_rest_patch_subset() {
                let server = make_server().await;
                let created = create_invoice(&server, "INV-1").await;
                let id = created["invoice_id"].as_i64().unwrap();

                let response = server
                    .patch(&format!("/api/invoices/{id}"))
                    .json(&json!({ "status": "S", "sap_invoice_number": "5100000042" }))
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["message"], "Invoice updated successfully");

                let updated = &body["data"];
                assert_eq!(updated["status"], "S");
                assert_eq!(updated["sap_invoice_number"], "5100000042");
                for untouched in [
                    "supplier_id",
                    "invoice_number",
                    "invoice_date",
                    "amount",
                    "currency_code",
                    "po_number",
                    "created_by",
                    "created_at",
                ] {
                    assert_eq!(updated[untouched], created[untouched], "{untouched} changed");
                }

                let before: chrono::DateTime<chrono::Utc> =
                    serde_json::from_value(created["updated_at"].clone()).unwrap();
                let after: chrono::DateTime<chrono::Utc> =
                    serde_json::from_value(updated["updated_at"].clone()).unwrap();
                assert!(after >= before);
            }

            #[tokio::test]
            async fn test_rest_patch_empty_body_leaves_row_unchanged() {
                let server = make_server().await;
                let created = create_invoice(&server, "INV-1").await;
                let id = created["invoice_id"].as_i64().unwrap();

                let response = server
                    .patch(&format!("/api/invoices/{id}"))
                    .json(&json!({}))
                    .await;
                response.assert_status_bad_request();
                response.assert_json(&json!({
                    "success": false,
                    "message": "No fields provided for update"
                }));

                let current: Value = server.get(&format!("/api/invoices/{id}")).await.json();
                assert_eq!(current["data"], created);
            }

            #[tokio::test]
            async fn test_rest_patch_unknown_keys_count_as_empty() {
                let server = make_server().await;
                let created = create_invoice(&server, "INV-1").await;
                let id = created["invoice_id"].as_i64().unwrap();

                let response = server
                    .patch(&format!("/api/invoices/{id}"))
                    .json(&json!({ "invoice_id": 42, "drop_table": "yes" }))
                    .await;
                response.assert_status_bad_request();
            }

            #[tokio::test]
            async fn test_rest_patch_invalid_status() {
                let server = make_server().await;
                let created = create_invoice(&server, "INV-1").await;
                let id = created["invoice_id"].as_i64().unwrap();

                let response = server
                    .patch(&format!("/api/invoices/{id}"))
                    .json(&json!({ "status": "Z" }))
                    .await;
                response.assert_status_bad_request();
                assert_eq!(
                    response.json::<Value>()["error"],
                    "Invalid status. Allowed values are S, P, E"
                );
            }

            #[tokio::test]
            async fn test_rest_patch_numeric_status_is_invalid_status() {
                let server = make_server().await;
                let created = create_invoice(&server, "INV-1").await;
                let id = created["invoice_id"].as_i64().unwrap();

                let response = server
                    .patch(&format!("/api/invoices/{id}"))
                    .json(&json!({ "status": 0 }))
                    .await;
                response.assert_status_bad_request();
                assert_eq!(
                    response.json::<Value>()["error"],
                    "Invalid status. Allowed values are S, P, E"
                );
            }

            #[tokio::test]
            async fn test_rest_patch_amount_is_rounded_to_cents() {
                let server = make_server().await;
                let created = create_invoice(&server, "INV-1").await;
                let id = created["invoice_id"].as_i64().unwrap();

                let response = server
                    .patch(&format!("/api/invoices/{id}"))
                    .json(&json!({ "amount": 12.345 }))
                    .await;
                response.assert_status_ok();
                assert_eq!(response.json::<Value>()["data"]["amount"], "12.35");
            }

            #[tokio::test]
            async fn test_rest_patch_explicit_null_clears_column() {
                let server = make_server().await;
                let created = create_invoice(&server, "INV-1").await;
                let id = created["invoice_id"].as_i64().unwrap();

                let response = server
                    .patch(&format!("/api/invoices/{id}"))
                    .json(&json!({ "po_number": null }))
                    .await;
                response.assert_status_ok();
                assert_eq!(response.json::<Value>()["data"]["po_number"], Value::Null);
            }

            #[tokio::test]
            async fn test_rest_patch_unknown_id_is_404() {
                let server = make_server().await;

                let response = server
                    .patch("/api/invoices/999999")
                    .json(&json!({ "status": "S" }))
                    .await;
                response.assert_status_not_found();
                assert_eq!(response.json::<Value>()["message"], "Invoice not found");
            }

            // ==============================================================
            // Put
            // ==============================================================

            #[tokio::test]
            async fn test_rest_put_replaces_fields() {
                let server = make_server().await;
                let created = create_invoice(&server, "INV-1").await;
                let id = created["invoice_id"].as_i64().unwrap();

                let response = server
                    .put(&format!("/api/invoices/{id}"))
                    .json(&json!({
                        "supplier_id": "SUP-009",
                        "invoice_number": "INV-1",
                        "invoice_date": "2024-03-31",
                        "amount": "999.99",
                        "currency_code": "CHF",
                        "status": "E",
                        "message": "Posting failed",
                        "updated_by": "bob"
                    }))
                    .await;
                response.assert_status_ok();

                let data = &response.json::<Value>()["data"];
                assert_eq!(data["supplier_id"], "SUP-009");
                assert_eq!(data["status"], "E");
                assert_eq!(data["message"], "Posting failed");
                assert_eq!(data["amount"], "999.99");
                assert_eq!(data["po_number"], Value::Null);
                assert_eq!(data["updated_by"], "bob");
                assert_eq!(data["created_at"], created["created_at"]);
            }

            #[tokio::test]
            async fn test_rest_put_missing_required_field_is_500() {
                let server = make_server().await;
                let created = create_invoice(&server, "INV-1").await;
                let id = created["invoice_id"].as_i64().unwrap();

                let response = server
                    .put(&format!("/api/invoices/{id}"))
                    .json(&json!({ "status": "S" }))
                    .await;
                response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(response.json::<Value>()["success"], false);

                let current: Value = server.get(&format!("/api/invoices/{id}")).await.json();
                assert_eq!(current["data"], created);
            }

            #[tokio::test]
            async fn test_rest_put_unknown_id_is_404() {
                let server = make_server().await;

                let response = server
                    .put("/api/invoices/999999")
                    .json(&sample_invoice_json("INV-1"))
                    .await;
                response.assert_status_not_found();
            }

            // ==============================================================
            // Delete
            // ==============================================================

            #[tokio::test]
            async fn test_rest_delete_then_get_is_404() {
                let server = make_server().await;
                let created = create_invoice(&server, "INV-1").await;
                let id = created["invoice_id"].as_i64().unwrap();

                let response = server.delete(&format!("/api/invoices/{id}")).await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["message"], "Invoice deleted successfully");
                assert_eq!(body["data"]["invoice_id"], id);

                server
                    .get(&format!("/api/invoices/{id}"))
                    .await
                    .assert_status_not_found();
                server
                    .delete(&format!("/api/invoices/{id}"))
                    .await
                    .assert_status_not_found();
            }

            #[tokio::test]
            async fn test_rest_delete_all_reports_count() {
                let server = make_server().await;
                for n in 1..=3 {
                    create_invoice(&server, &format!("INV-{n}")).await;
                }

                let response = server.delete("/api/invoices").await;
                response.assert_status_ok();
                response.assert_json(&json!({
                    "success": true,
                    "message": "All invoices deleted successfully",
                    "deletedCount": 3
                }));

                let list: Value = server.get("/api/invoices").await.json();
                assert_eq!(list["count"], 0);
            }

            // ==============================================================
            // Invoice lines
            // ==============================================================

            #[tokio::test]
            async fn test_rest_create_invoice_line() {
                let server = make_server().await;

                let response = server
                    .post("/api/new-invoices")
                    .json(&json!({
                        "invoice_number": "INV-1",
                        "supplier_number": "SUP-001",
                        "description": "Bolts",
                        "quantity": 4,
                        "unit_price": 2.25,
                        "currency": "EUR",
                        "line_total": 1
                    }))
                    .await;
                response.assert_status(StatusCode::CREATED);

                let body: Value = response.json();
                assert_eq!(body["message"], "Invoice line created successfully");
                assert_eq!(body["data"]["quantity"], "4.000");
                assert_eq!(body["data"]["unit_price"], "2.25");
                assert_eq!(json_dec(&body["data"]["line_total"]), dec("9"));

                let id = body["data"]["id"].as_i64().unwrap();
                let fetched: Value = server.get(&format!("/api/new-invoices/{id}")).await.json();
                assert_eq!(fetched["data"]["description"], "Bolts");

                let list: Value = server.get("/api/new-invoices").await.json();
                assert_eq!(list["count"], 1);
            }

            #[tokio::test]
            async fn test_rest_get_unknown_invoice_line_is_404() {
                let server = make_server().await;

                let response = server.get("/api/new-invoices/999999").await;
                response.assert_status_not_found();
                response.assert_json(&json!({
                    "success": false,
                    "message": "Invoice line not found"
                }));
            }

            #[tokio::test]
            async fn test_rest_create_invoice_line_table_is_idempotent() {
                let server = make_server().await;

                for _ in 0..2 {
                    let response = server.post("/api/create-new-invoice-table").await;
                    response.assert_status_ok();
                    response.assert_json(&json!({
                        "success": true,
                        "message": "Invoice line table created successfully"
                    }));
                }
            }

            // ==============================================================
            // Health
            // ==============================================================

            #[tokio::test]
            async fn test_rest_health() {
                let server = make_server().await;

                for path in ["/health", "/healthz"] {
                    let response = server.get(path).await;
                    response.assert_status_ok();
                    let body: Value = response.json();
                    assert_eq!(body["success"], true);
                    assert_eq!(body["message"], "API is running successfully");
                    assert!(body["timestamp"].as_str().is_some());
                }
            }
        }
    };
}
