//! API client tests against a mock service.

use crosscheck_client::{ApiClient, ApiError, SessionContext};
use crosscheck_protocol::{FileType, ReconMethod, ReconcileRequest};
use httpmock::prelude::*;
use serde_json::json;

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(SessionContext::new("tok".into(), server.base_url()))
}

#[test]
fn list_files_parses_camel_case_listing() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/files")
            .header("authorization", "Bearer tok");
        then.status(200).json_body(json!({
            "files": [
                { "fileName": "ledger.xlsx", "uploadTime": "2026-07-01T09:00:00Z",
                  "downloadUrl": "https://files/ledger.xlsx" },
                { "fileName": "bank.csv" },
            ]
        }));
    });

    let files = client_for(&server).list_files().unwrap();
    mock.assert();

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].file_name, "ledger.xlsx");
    assert_eq!(files[0].upload_time.as_deref(), Some("2026-07-01T09:00:00Z"));
    assert!(files[1].upload_time.is_none());
}

#[test]
fn get_file_details_for_excel_and_csv_shapes() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/files/ledger.xlsx/details");
        then.status(200).json_body(json!({
            "fileType": "Excel",
            "sheets": {
                "Q3": { "columns": ["Invoice", "Amount"],
                        "columnTypes": { "Invoice": "text", "Amount": "float" } }
            }
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/files/bank.csv/details");
        then.status(200).json_body(json!({
            "fileType": "CSV",
            "columns": ["invoice_no", "amount"],
            "columnTypes": { "invoice_no": "text", "amount": "float" }
        }));
    });

    let client = client_for(&server);
    let excel = client.get_file_details("ledger.xlsx").unwrap();
    assert_eq!(excel.file_type, FileType::Excel);
    assert!(excel.sheets.unwrap().contains_key("Q3"));

    let csv = client.get_file_details("bank.csv").unwrap();
    assert_eq!(csv.file_type, FileType::Csv);
    assert_eq!(csv.columns.unwrap(), vec!["invoice_no", "amount"]);
}

#[test]
fn details_pair_fetches_both_files() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(GET).path("/api/files/a.csv/details");
        then.status(200).json_body(json!({
            "fileType": "CSV", "columns": ["id"], "columnTypes": { "id": "text" }
        }));
    });
    let second = server.mock(|when, then| {
        when.method(GET).path("/api/files/b.csv/details");
        then.status(200).json_body(json!({
            "fileType": "CSV", "columns": ["ref"], "columnTypes": { "ref": "text" }
        }));
    });

    let (a, b) = client_for(&server).get_details_pair("a.csv", "b.csv").unwrap();
    first.assert();
    second.assert();
    assert_eq!(a.columns.unwrap(), vec!["id"]);
    assert_eq!(b.columns.unwrap(), vec!["ref"]);
}

#[test]
fn details_pair_fails_as_a_whole() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/files/a.csv/details");
        then.status(200).json_body(json!({
            "fileType": "CSV", "columns": ["id"], "columnTypes": { "id": "text" }
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/files/missing.csv/details");
        then.status(500).body("boom");
    });

    let err = client_for(&server)
        .get_details_pair("a.csv", "missing.csv")
        .unwrap_err();
    assert!(matches!(err, ApiError::Http(500, _)));
}

#[test]
fn submit_posts_request_and_parses_response() {
    let request: ReconcileRequest = serde_json::from_value(json!({
        "files": [
            { "file_name": "ledger.xlsx", "sheet_name": "Q3" },
            { "file_name": "bank.csv", "sheet_name": "Sheet1" },
        ],
        "matching_keys": [],
        "keys": [],
        "values": [],
        "reconciliation_settings": {
            "method": "many-to-many",
            "handling_duplicate_matches": null,
            "based_on_columns": null,
        },
        "cross_reference": { "file1_column": "Invoice", "file2_column": null },
        "output_file": "recon_q3.xlsx",
        "replace_existing": false,
        "settings": {
            "method": "many-to-many",
            "handling_duplicate_matches": null,
            "based_on_columns": null,
        },
    }))
    .unwrap();
    assert_eq!(request.reconciliation_settings.method, ReconMethod::ManyToMany);

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/reconcile")
            .header("authorization", "Bearer tok")
            .json_body(serde_json::to_value(&request).unwrap());
        then.status(200).json_body(json!({
            "message": "Reconciliation started",
            "downloadUrl": "https://files/recon_q3.xlsx"
        }));
    });

    let response = client_for(&server).submit_reconciliation(&request).unwrap();
    mock.assert();
    assert_eq!(response.message.as_deref(), Some("Reconciliation started"));
    assert_eq!(response.download_url.as_deref(), Some("https://files/recon_q3.xlsx"));
}

#[test]
fn validation_errors_are_distinguished() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/files");
        then.status(422).body("unknown column 'Invoce'");
    });

    let err = client_for(&server).list_files().unwrap_err();
    match err {
        ApiError::Validation(msg) => assert!(msg.contains("Invoce")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn http_errors_carry_the_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/files");
        then.status(401).body("bad token");
    });

    let err = client_for(&server).verify_session().unwrap_err();
    assert!(matches!(err, ApiError::Http(401, _)));
}
