//! HTTP-level tests driving the router in-process

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use backend::routes::build_router;
use backend::shared::app_state::AppState;
use backend::shared::config::Config;
use backend::shared::data::db::initialize_database;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;

const BOUNDARY: &str = "----tracker-test-boundary";

async fn setup() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = initialize_database(&dir.path().join("api.db")).await.unwrap();
    let state = AppState::new(db, Config::default()).unwrap();
    (build_router(state), dir)
}

fn markup(job: &str, bundle: &str) -> String {
    format!(
        "<VIRTEK_BUILDING_MATERIAL_MARKUP_LANGUAGE_FILE>\
         <HEADER_DATA><JOB_NAME>{job}</JOB_NAME></HEADER_DATA>\
         <STRUCTURE_DATA><STRUCTURE_ID>{bundle}</STRUCTURE_ID></STRUCTURE_DATA>\
         <MEMBER_DATA><MEMBER_ID>1</MEMBER_ID><TYPE>STUD</TYPE>\
         <DESCRIPTION>2x6</DESCRIPTION><LENGTH unit=\"in\">96.5</LENGTH></MEMBER_DATA>\
         <MEMBER_DATA><MEMBER_ID>2</MEMBER_ID><TYPE>STUD</TYPE>\
         <DESCRIPTION>2x6</DESCRIPTION><LENGTH unit=\"in\">96.5</LENGTH></MEMBER_DATA>\
         <MEMBER_DATA><MEMBER_ID>3</MEMBER_ID><TYPE>TOP PLATE</TYPE>\
         <DESCRIPTION>2x6</DESCRIPTION><LENGTH unit=\"in\">120</LENGTH></MEMBER_DATA>\
         </VIRTEK_BUILDING_MATERIAL_MARKUP_LANGUAGE_FILE>"
    )
}

fn multipart_body(file_name: &str, content: &str, replace: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(flag) = replace {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"replace\"\r\n\r\n{flag}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n{content}\r\n--{BOUNDARY}--\r\n"
    ));
    body
}

fn multipart_request(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn upload(app: &Router, job: &str, bundle: &str, replace: Option<&str>) -> (StatusCode, Value) {
    let body = multipart_body("bundle.xml", &markup(job, bundle), replace);
    send(app, multipart_request("/api/u501/upload", body)).await
}

async fn assign(app: &Router, job: &str, bundle: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            "POST",
            "/api/a003/line-assignments",
            json!({
                "job_number": job,
                "bundle": bundle,
                "line_number": 1,
                "assignment_date": "2026-03-02",
                "lineal_feet": 120.5
            }),
        ),
    )
    .await
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = setup().await;
    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upload_conflict_and_replace() {
    let (app, _dir) = setup().await;

    let (status, body) = upload(&app, "J100", "B1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["jobNumber"], "J100");
    assert_eq!(body["bundleName"], "B1");
    assert_eq!(body["membersInserted"], 3);
    assert_eq!(body["replaced"], false);

    let (status, body) = upload(&app, "J100", "B1", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "exists");
    assert_eq!(body["jobNumber"], "J100");
    assert_eq!(body["bundleName"], "B1");

    let (status, body) = upload(&app, "J100", "B1", Some("yes")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["replaced"], true);

    let (status, jobs) = send(&app, get("/api/d400/jobs")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(jobs.as_array().unwrap().len(), 1);
    assert_eq!(jobs[0]["bundle_count"], 1);
    assert_eq!(jobs[0]["member_count"], 3);
}

#[tokio::test]
async fn test_upload_rejects_bad_input() {
    let (app, _dir) = setup().await;

    let (status, body) = send(
        &app,
        multipart_request("/api/u501/upload", multipart_body("b.xml", "<ROOT/>", None)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/u501/upload-json",
            json!({ "fileName": "b.xml", "fileData": "%%% not base64 %%%" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("base64"));
}

#[tokio::test]
async fn test_upload_json() {
    use base64::Engine;
    let (app, _dir) = setup().await;
    let data = base64::engine::general_purpose::STANDARD.encode(markup("J7", "B2"));

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/u501/upload-json",
            json!({ "fileName": "b2.xml", "fileData": data }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jobNumber"], "J7");
}

#[tokio::test]
async fn test_job_drilldown() {
    let (app, _dir) = setup().await;
    upload(&app, "J200", "B3", None).await;

    let (status, detail) = send(&app, get("/api/d400/jobs/J200")).await;
    assert_eq!(status, StatusCode::OK);
    let bundle = &detail["bundles"][0];
    assert_eq!(bundle["bundle_name"], "B3");
    let id = bundle["id"].as_str().unwrap().to_string();

    let (status, typed) = send(&app, get(&format!("/api/d400/bundles/{id}/types/STUD"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(typed["members"].as_array().unwrap().len(), 2);

    let (status, _) = send(&app, get("/api/d400/jobs/NOPE")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/api/a001/bundles/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_station_complete_and_undo() {
    let (app, _dir) = setup().await;
    upload(&app, "J300", "B4", None).await;

    let (status, assignment) = assign(&app, "J300", "B4").await;
    assert_eq!(status, StatusCode::OK);
    let id = assignment["id"].as_str().unwrap().to_string();
    assert_eq!(assignment["members_data"].as_array().unwrap().len(), 3);

    let complete = format!("/api/a003/line-assignments/{id}/stations/popup/complete");
    let undo = format!("/api/a003/line-assignments/{id}/stations/popup/undo");

    let (status, updated) = send(&app, json_request("POST", &complete, Value::Null)).await;
    assert_eq!(status, StatusCode::OK);
    let popup = updated["stations"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "popup")
        .unwrap()
        .clone();
    assert_eq!(popup["completed"], true);
    assert!(popup["completedAt"].is_string());

    let (status, _) = send(&app, json_request("POST", &complete, Value::Null)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let view = "/api/d401/station-view?line=1&date=2026-03-02&station=popup";
    let (status, pending) = send(&app, get(view)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(pending["rows"].as_array().unwrap().is_empty());

    let (_, all) = send(&app, get(&format!("{view}&show_completed=true"))).await;
    assert_eq!(all["rows"].as_array().unwrap().len(), 1);
    assert_eq!(all["rows"][0]["station_completed"], true);

    let (status, _) = send(&app, json_request("POST", &undo, Value::Null)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, json_request("POST", &undo, Value::Null)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let unknown = format!("/api/a003/line-assignments/{id}/stations/paint/complete");
    let (status, _) = send(&app, json_request("POST", &unknown, Value::Null)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, dates) = send(&app, get("/api/d401/station-view/dates?line=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dates["dates"], json!(["2026-03-02"]));
}

#[tokio::test]
async fn test_assign_unknown_bundle() {
    let (app, _dir) = setup().await;
    let (status, body) = assign(&app, "J999", "B9").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_manifest_and_batch_send() {
    let (app, _dir) = setup().await;
    upload(&app, "J400", "B5", None).await;

    let csv = "a,b,Job,Bundle,Feet\n\
               x,y,J400,B5,\"1,250.5\"\n\
               x,y,J401,B6,300\n\
               x,y,J402,,10\n";
    let (status, manifest) = send(
        &app,
        multipart_request("/api/u502/manifest?line=1", multipart_body("line1.csv", csv, None)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = manifest["rows"].as_array().unwrap().clone();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["job_number"], "J400");
    assert!(rows[0]["studs_summary"].is_string());
    assert!(rows[1]["studs_summary"].is_null());

    let (status, batch) = send(
        &app,
        json_request(
            "POST",
            "/api/a003/line-assignments/batch",
            json!({ "line_number": 1, "assignment_date": "2026-03-03", "rows": rows }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(batch["assigned"].as_array().unwrap().len(), 1);
    assert_eq!(batch["assigned"][0]["lineal_feet"], 1250.5);
    assert_eq!(batch["rejected"][0]["job_number"], "J401");

    let (status, _) = send(
        &app,
        multipart_request("/api/u502/manifest?line=3", multipart_body("x.csv", csv, None)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
