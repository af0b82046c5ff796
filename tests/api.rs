//! Router-level tests against an in-memory SQLite database

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use feira::api::{self, AppState};
use feira::cache::create_cache;
use feira::config::{CacheConfig, UploadConfig};
use feira::db::repositories::{
    SqlxCarouselRepository, SqlxEventRepository, SqlxExhibitorRepository,
    SqlxNotificationRepository, SqlxSettingsRepository,
};
use feira::db::{create_test_pool, migrations};
use feira::services::{
    CarouselService, EventService, ExhibitorService, NotificationService, SettingsService,
};

struct TestApp {
    server: TestServer,
    uploads: TempDir,
}

async fn setup() -> TestApp {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    let cache = create_cache(&CacheConfig::default());
    let uploads = TempDir::new().expect("Failed to create upload dir");

    let state = AppState {
        pool: pool.clone(),
        exhibitor_service: Arc::new(ExhibitorService::new(
            SqlxExhibitorRepository::boxed(pool.clone()),
            cache.clone(),
        )),
        event_service: Arc::new(EventService::new(
            SqlxEventRepository::boxed(pool.clone()),
            cache.clone(),
        )),
        notification_service: Arc::new(NotificationService::new(
            SqlxNotificationRepository::boxed(pool.clone()),
            cache.clone(),
        )),
        carousel_service: Arc::new(CarouselService::new(
            SqlxCarouselRepository::boxed(pool.clone()),
            cache.clone(),
        )),
        settings_service: Arc::new(SettingsService::new(
            SqlxSettingsRepository::boxed(pool),
            cache,
        )),
        upload_config: Arc::new(UploadConfig {
            path: uploads.path().to_path_buf(),
            ..UploadConfig::default()
        }),
    };

    let server = TestServer::new(api::build_router(state, "*")).expect("Failed to start server");
    TestApp { server, uploads }
}

async fn create_exhibitor(server: &TestServer, name: &str, category: &str, position: Option<(f64, f64)>) {
    let (x, y) = position
        .map(|(x, y)| (x.to_string(), y.to_string()))
        .unwrap_or_default();
    let response = server
        .post("/admin/exhibitors")
        .form(&[
            ("name", name),
            ("description", "Soluções completas para o campo"),
            ("category", category),
            ("location", "Pavilhão A"),
            ("map_x", x.as_str()),
            ("map_y", y.as_str()),
        ])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
}

async fn create_event(server: &TestServer, title: &str, date: &str, start: &str, kind: &str) {
    let response = server
        .post("/admin/events")
        .form(&[
            ("title", title),
            ("description", "Atividade da programação oficial"),
            ("date", date),
            ("start_time", start),
            ("end_time", "23:00"),
            ("location", "Arena"),
            ("type", kind),
            ("tags", "gado, leilão"),
            ("featured", "on"),
        ])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
}

fn names(body: &Value, field: &str) -> Vec<String> {
    body["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .map(|item| item[field].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let app = setup().await;
    let body: Value = app.server.get("/health").await.json();
    assert_eq!(body, json!({ "success": true, "data": { "database": "ok" } }));
}

#[tokio::test]
async fn test_admin_create_redirects_and_lists() {
    let app = setup().await;
    let response = app
        .server
        .post("/admin/exhibitors")
        .form(&[
            ("name", "AgroTech"),
            ("description", "Máquinas agrícolas de precisão"),
            ("category", "Máquinas"),
            ("location", "Pavilhão A"),
        ])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/admin/exhibitors");

    let body: Value = app.server.get("/api/exhibitors").await.json();
    assert_eq!(body["success"], true);
    assert_eq!(names(&body, "name"), vec!["AgroTech"]);
}

#[tokio::test]
async fn test_admin_invalid_form_reports_fields() {
    let app = setup().await;
    let response = app
        .server
        .post("/admin/exhibitors")
        .form(&[("name", "A"), ("description", "curta"), ("email", "nope")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    assert!(body["errors"]["name"].is_string());
    assert!(body["errors"]["description"].is_string());
    assert!(body["errors"]["category"].is_string());
    assert_eq!(body["errors"]["email"], "Email inválido");

    let body: Value = app.server.get("/api/exhibitors").await.json();
    assert!(names(&body, "name").is_empty());
}

#[tokio::test]
async fn test_exhibitor_filters_and_sort() {
    let app = setup().await;
    create_exhibitor(&app.server, "Zeta Sementes", "Sementes", None).await; // id 1, size 10
    create_exhibitor(&app.server, "Alpha Tratores", "Máquinas", None).await; // id 2, size 20
    create_exhibitor(&app.server, "Beta Implementos", "Máquinas", None).await; // id 3, size 30

    let body: Value = app
        .server
        .get("/api/exhibitors")
        .add_query_param("category", "máquinas")
        .add_query_param("order", "desc")
        .await
        .json();
    assert_eq!(names(&body, "name"), vec!["Beta Implementos", "Alpha Tratores"]);

    let body: Value = app
        .server
        .get("/api/exhibitors")
        .add_query_param("min_size", "15")
        .add_query_param("max_size", "25")
        .await
        .json();
    assert_eq!(names(&body, "name"), vec!["Alpha Tratores"]);

    let body: Value = app
        .server
        .get("/api/exhibitors")
        .add_query_param("favorites_only", "true")
        .add_query_param("favorites", "1,3")
        .add_query_param("q", "SEMENTES")
        .await
        .json();
    assert_eq!(names(&body, "name"), vec!["Zeta Sementes"]);
}

#[tokio::test]
async fn test_exhibitor_lookup_and_update() {
    let app = setup().await;
    create_exhibitor(&app.server, "AgroTech", "Máquinas", None).await;

    let missing = app.server.get("/api/exhibitors/42").await;
    missing.assert_status(StatusCode::NOT_FOUND);
    let body: Value = missing.json();
    assert_eq!(body["success"], false);

    app.server
        .post("/admin/exhibitors/1")
        .form(&[
            ("name", "AgroTech Sul"),
            ("description", "Máquinas agrícolas de precisão"),
            ("category", "Máquinas"),
            ("location", "Pavilhão C"),
        ])
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let body: Value = app.server.get("/api/exhibitors/1").await.json();
    assert_eq!(body["data"]["name"], "AgroTech Sul");
    assert_eq!(body["data"]["location"], "Pavilhão C");

    app.server
        .post("/admin/exhibitors/1/delete")
        .await
        .assert_status(StatusCode::SEE_OTHER);
    app.server
        .get("/api/exhibitors/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_filters() {
    let app = setup().await;
    create_event(&app.server, "Leilão Nelore", "2026-05-05", "14:00", "leilão").await;
    create_event(&app.server, "Abertura", "2026-05-04", "09:00", "cerimônia").await;
    create_event(&app.server, "Palestra Solo", "2026-05-04", "16:00", "palestra").await;

    let body: Value = app.server.get("/api/events").await.json();
    assert_eq!(
        names(&body, "title"),
        vec!["Abertura", "Palestra Solo", "Leilão Nelore"]
    );
    assert_eq!(body["data"][0]["start_time"], "09:00");
    assert_eq!(body["data"][0]["type"], "cerimônia");
    assert_eq!(body["data"][2]["tags"], json!(["gado", "leilão"]));

    let body: Value = app
        .server
        .get("/api/events")
        .add_query_param("from_hour", "12")
        .add_query_param("to_hour", "24")
        .add_query_param("sort", "title")
        .await
        .json();
    assert_eq!(names(&body, "title"), vec!["Leilão Nelore", "Palestra Solo"]);

    let body: Value = app
        .server
        .get("/api/events")
        .add_query_param("type", "Palestra")
        .await
        .json();
    assert_eq!(names(&body, "title"), vec!["Palestra Solo"]);
}

#[tokio::test]
async fn test_event_time_validation() {
    let app = setup().await;
    let response = app
        .server
        .post("/admin/events")
        .form(&[
            ("title", "Abertura"),
            ("description", "Cerimônia de abertura da feira"),
            ("date", "04/05/2026"),
            ("start_time", "10:00"),
            ("end_time", "09:00"),
            ("location", "Arena"),
            ("type", "cerimônia"),
        ])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["errors"]["date"].is_string());
    assert!(body["errors"]["end_time"].is_string());
}

#[tokio::test]
async fn test_notifications_flow() {
    let app = setup().await;
    for title in ["Primeira", "Segunda"] {
        app.server
            .post("/admin/notifications")
            .form(&[
                ("title", title),
                ("message", "Mudança na programação"),
                ("type", "schedule-change"),
            ])
            .await
            .assert_status(StatusCode::SEE_OTHER);
    }

    let body: Value = app.server.get("/api/notifications").await.json();
    assert_eq!(names(&body, "title"), vec!["Segunda", "Primeira"]);
    assert_eq!(body["data"][0]["type"], "schedule-change");
    assert_eq!(body["data"][0]["read"], false);

    let id = body["data"][0]["id"].as_i64().unwrap();
    let body: Value = app
        .server
        .post(&format!("/api/notifications/{}/read", id))
        .await
        .json();
    assert_eq!(body["data"]["read"], true);

    app.server
        .post("/api/notifications/999/read")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .post(&format!("/admin/notifications/{}/delete", id))
        .await
        .assert_status(StatusCode::SEE_OTHER);
    let body: Value = app.server.get("/api/notifications").await.json();
    assert_eq!(names(&body, "title"), vec!["Primeira"]);
}

#[tokio::test]
async fn test_settings_defaults_and_update() {
    let app = setup().await;
    let body: Value = app.server.get("/api/settings").await.json();
    assert_eq!(body["data"]["site_name"], "Feira Agropecuária");
    assert_eq!(body["data"]["instagram"], "");

    let response = app
        .server
        .put("/api/settings")
        .json(&json!({
            "site_name": "ExpoAgro",
            "event_start_date": "2026-05-04",
            "event_end_date": "2026-05-10",
            "contact_email": "contato@expoagro.com.br",
            "whatsapp": "+55 11 99999-0000"
        }))
        .await;
    response.assert_status_ok();

    let body: Value = app.server.get("/api/settings").await.json();
    assert_eq!(body["data"]["site_name"], "ExpoAgro");
    assert_eq!(body["data"]["whatsapp"], "+55 11 99999-0000");

    let response = app
        .server
        .put("/api/settings")
        .json(&json!({ "site_name": "ExpoAgro", "contact_email": "contato" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_carousel_reorder() {
    let app = setup().await;
    let mut ids = Vec::new();
    for title in ["a", "b", "c"] {
        let body: Value = app
            .server
            .post("/api/carousel")
            .json(&json!({ "title": format!("Slide {}", title), "image": format!("/uploads/carousel/{}.png", title) }))
            .await
            .json();
        ids.push(body["data"]["id"].as_i64().unwrap());
    }

    let body: Value = app
        .server
        .put("/api/carousel/reorder")
        .json(&json!({ "ids": [ids[2], ids[0], ids[1]] }))
        .await
        .json();
    let order: Vec<(String, i64)> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| (s["title"].as_str().unwrap().to_string(), s["order"].as_i64().unwrap()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Slide c".to_string(), 1),
            ("Slide a".to_string(), 2),
            ("Slide b".to_string(), 3)
        ]
    );

    let response = app
        .server
        .put("/api/carousel/reorder")
        .json(&json!({ "ids": [ids[0], 999] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = app.server.get("/api/carousel").await.json();
    assert_eq!(names(&body, "title"), vec!["Slide c", "Slide a", "Slide b"]);
}

#[tokio::test]
async fn test_carousel_update_delete_and_active_filter() {
    let app = setup().await;
    for title in ["Um", "Dois"] {
        app.server
            .post("/api/carousel")
            .json(&json!({ "title": title, "image": "/uploads/carousel/x.png" }))
            .await
            .assert_status_ok();
    }

    app.server
        .put("/api/carousel/1")
        .json(&json!({ "active": false }))
        .await
        .assert_status_ok();

    let body: Value = app
        .server
        .get("/api/carousel")
        .add_query_param("active", "true")
        .await
        .json();
    assert_eq!(names(&body, "title"), vec!["Dois"]);

    app.server.delete("/api/carousel/1").await.assert_status_ok();
    let body: Value = app.server.get("/api/carousel").await.json();
    assert_eq!(body["data"][0]["order"], 1);
    app.server
        .delete("/api/carousel/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_image() {
    let app = setup().await;
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3])
            .file_name("Banner Principal.png")
            .mime_type("image/png"),
    );
    let response = app.server.post("/api/upload/carousel").multipart(form).await;
    response.assert_status_ok();

    let body: Value = response.json();
    let filename = body["data"]["filename"].as_str().unwrap().to_string();
    assert!(filename.ends_with("-Banner_Principal.png"));
    assert_eq!(body["data"]["url"], format!("/uploads/carousel/{}", filename));
    assert_eq!(body["data"]["size"], 8);
    assert_eq!(body["data"]["content_type"], "image/png");
    assert!(app.uploads.path().join("carousel").join(&filename).exists());

    let served = app.server.get(&format!("/uploads/carousel/{}", filename)).await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().len(), 8);
}

#[tokio::test]
async fn test_upload_rejects_oversized_file_without_writing() {
    let app = setup().await;
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(vec![7u8; 6 * 1024 * 1024])
            .file_name("grande.jpg")
            .mime_type("image/jpeg"),
    );
    let response = app.server.post("/api/upload/carousel").multipart(form).await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Arquivo muito grande. Máximo 5MB");

    let dir = app.uploads.path().join("carousel");
    let written = std::fs::read_dir(&dir).map(|d| d.count()).unwrap_or(0);
    assert_eq!(written, 0);
}

#[tokio::test]
async fn test_upload_rejects_bad_input() {
    let app = setup().await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"hello".to_vec())
            .file_name("notas.txt")
            .mime_type("text/plain"),
    );
    let response = app.server.post("/api/upload/carousel").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["error"],
        "Tipo de arquivo inválido. Apenas imagens são permitidas"
    );

    let form = MultipartForm::new().add_text("title", "sem arquivo");
    let response = app.server.post("/api/upload/carousel").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Nenhum arquivo enviado");
}

#[tokio::test]
async fn test_map_markers_skip_unplaced_exhibitors() {
    let app = setup().await;
    create_exhibitor(&app.server, "AgroTech", "Máquinas", Some((300.0, 200.0))).await;
    create_exhibitor(&app.server, "Sem Estande", "Serviços", None).await;

    let body: Value = app.server.get("/api/map/markers").await.json();
    let markers = body["data"].as_array().unwrap();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0]["name"], "AgroTech");
}

#[tokio::test]
async fn test_map_markers_ignore_non_finite_zoom() {
    let app = setup().await;
    create_exhibitor(&app.server, "AgroTech", "Máquinas", Some((300.0, 200.0))).await;

    for zoom in ["NaN", "inf", "-inf"] {
        let response = app.server.get("/api/map/markers").add_query_param("zoom", zoom).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"][0]["screen"]["x"], 300.0, "zoom={zoom}");
        assert_eq!(body["data"][0]["screen"]["y"], 200.0, "zoom={zoom}");
    }
}

fn assert_error_envelope(response: &axum_test::TestResponse) {
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn test_malformed_path_is_enveloped() {
    let app = setup().await;
    assert_error_envelope(&app.server.get("/api/exhibitors/abc").await);
    assert_error_envelope(&app.server.get("/api/events/abc").await);
    assert_error_envelope(&app.server.post("/api/notifications/abc/read").await);
    assert_error_envelope(&app.server.delete("/api/carousel/abc").await);
    assert_error_envelope(&app.server.post("/admin/events/abc/delete").await);
}

#[tokio::test]
async fn test_malformed_json_is_enveloped() {
    let app = setup().await;
    assert_error_envelope(
        &app.server
            .put("/api/carousel/reorder")
            .json(&json!({ "ids": ["c", "a", "b"] }))
            .await,
    );
    assert_error_envelope(
        &app.server
            .put("/api/settings")
            .bytes("{not json".into())
            .content_type("application/json")
            .await,
    );
}

#[tokio::test]
async fn test_malformed_query_is_enveloped() {
    let app = setup().await;
    assert_error_envelope(
        &app.server
            .get("/api/exhibitors")
            .add_query_param("min_size", "abc")
            .await,
    );
}
