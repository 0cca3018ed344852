//! Wire format of the REST client against a mock backend.

use std::sync::Arc;

use chrono::NaiveDate;
use mockito::{Matcher, Server};
use routebill_data::{
    DataClient, DataError, Filter, InvoiceRunMode, Procedures, Query, RestClient,
};
use routebill_shared::AppError;
use routebill_shared::config::BackendConfig;
use serde_json::json;

fn client(server: &Server) -> RestClient {
    RestClient::new(&BackendConfig {
        url: format!("{}/", server.url()),
        api_key: "anon-key".to_string(),
        schema: "public".to_string(),
        request_timeout_secs: Some(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_select_sends_auth_and_filters() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/invoices")
        .match_header("apikey", "anon-key")
        .match_header("authorization", "Bearer anon-key")
        .match_header("accept-profile", "public")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".into(), "*".into()),
            Matcher::UrlEncoded("period_start".into(), "gte.2024-06-01".into()),
            Matcher::UrlEncoded("status".into(), "neq.void".into()),
            Matcher::UrlEncoded("order".into(), "period_start.desc".into()),
            Matcher::UrlEncoded("limit".into(), "50".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"invoice_id":"a"},{"invoice_id":"b"}]"#)
        .create_async()
        .await;

    let query = Query::table("invoices")
        .gte("period_start", "2024-06-01")
        .neq("status", "void")
        .order("period_start", false)
        .limit(50);
    let rows = client(&server).select(&query).await.unwrap();

    mock.assert_async().await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("invoice_id"), Some(&json!("b")));
}

#[tokio::test]
async fn test_count_reads_content_range() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("HEAD", "/rest/v1/customers")
        .match_header("prefer", "count=exact")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".into(), "customer_id".into()),
            Matcher::UrlEncoded("status".into(), "eq.active".into()),
        ]))
        .with_status(200)
        .with_header("content-range", "0-1/42")
        .create_async()
        .await;

    let query = Query::table("customers")
        .select("customer_id")
        .eq("status", "active");
    let count = client(&server).count(&query).await.unwrap();

    mock.assert_async().await;
    assert_eq!(count, 42);
}

#[tokio::test]
async fn test_count_without_range_is_decode_error() {
    let mut server = Server::new_async().await;
    server
        .mock("HEAD", "/rest/v1/routes")
        .match_query(Matcher::Any)
        .with_status(200)
        .create_async()
        .await;

    let err = client(&server)
        .count(&Query::table("routes"))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Decode(_)));
}

#[tokio::test]
async fn test_update_writes_patch_and_filters() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PATCH", "/rest/v1/invoices")
        .match_header("prefer", "return=representation")
        .match_header("content-profile", "public")
        .match_query(Matcher::UrlEncoded("invoice_id".into(), "eq.inv-1".into()))
        .match_body(Matcher::Json(json!({ "status": "sent" })))
        .with_status(200)
        .with_body(r#"[{"invoice_id":"inv-1","status":"sent"}]"#)
        .create_async()
        .await;

    let mut patch = routebill_data::Row::new();
    patch.insert("status".into(), json!("sent"));
    let rows = client(&server)
        .update("invoices", &[Filter::eq("invoice_id", "inv-1")], patch)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_error_body_becomes_app_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/rest/v1/customers")
        .with_status(409)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"code":"23505","message":"duplicate key value violates unique constraint","details":null,"hint":null}"#,
        )
        .create_async()
        .await;

    let mut row = routebill_data::Row::new();
    row.insert("display_name".into(), json!("Alice"));
    let err = client(&server).insert("customers", row).await.unwrap_err();

    assert_eq!(
        err,
        DataError::Backend {
            status: 409,
            code: Some("23505".into()),
            message: "duplicate key value violates unique constraint".into(),
        }
    );
    let app = AppError::from(err);
    assert_eq!(app.status_code(), 409);
    assert_eq!(app.error_code(), "CONFLICT");
}

#[tokio::test]
async fn test_plain_error_body_is_kept() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/v1/routes")
        .match_query(Matcher::Any)
        .with_status(502)
        .with_body("upstream timed out")
        .create_async()
        .await;

    let err = client(&server)
        .select(&Query::table("routes"))
        .await
        .unwrap_err();
    assert_eq!(err, DataError::backend(502, "upstream timed out"));
}

#[tokio::test]
async fn test_invoice_run_over_rest() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/v1/rpc/generate_due_invoices")
        .match_body(Matcher::Json(
            json!({ "p_run_date": "2024-06-01", "p_mode": "manual" }),
        ))
        .with_status(200)
        .with_body(r#"[{"created_count":2,"skipped_count":1}]"#)
        .create_async()
        .await;

    let procedures = Procedures::new(Arc::new(client(&server)));
    let result = procedures
        .generate_due_invoices(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            InvoiceRunMode::Manual,
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.created, 2);
    assert_eq!(result.skipped, 1);
}

#[tokio::test]
async fn test_invoice_number_over_rest() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/rest/v1/rpc/next_invoice_number")
        .with_status(200)
        .with_body(r#""INV-0042""#)
        .create_async()
        .await;

    let procedures = Procedures::new(Arc::new(client(&server)));
    assert_eq!(procedures.next_invoice_number().await.unwrap(), "INV-0042");
}
