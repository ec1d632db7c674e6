//! End-to-end tests for the REST router: login, the middleware stack and the
//! record namespaces, driven through `tower::ServiceExt::oneshot` against a
//! temp-dir data directory.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use api_rest::{build_router, AppState};
use maternidad_core::config::CoreConfig;
use maternidad_core::identity::{NewUser, UserDirectory};
use maternidad_core::provisioning::ensure_default_admin;
use maternidad_core::roles::Group;

fn test_app(dir: &TempDir) -> (Router, Arc<UserDirectory>) {
    let cfg = Arc::new(
        CoreConfig::with_data_dir(dir.path().to_path_buf()).expect("Should build config"),
    );
    let users = Arc::new(UserDirectory::open(&cfg).expect("Should open directory"));
    (build_router(AppState::new(cfg, Arc::clone(&users))), users)
}

fn add_staff_user(users: &UserDirectory, username: &str, group: Group) {
    users
        .add_user(NewUser {
            username: username.to_owned(),
            password: "secreto123".to_owned(),
            full_name: format!("Prueba {username}"),
            email: format!("{username}@hospital.cl"),
            rut: None,
            groups: [group].into_iter().collect(),
            superuser: false,
        })
        .expect("Should add user");
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Should build request");
    app.clone()
        .oneshot(request)
        .await
        .expect("Should route request")
}

async fn json_body(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Should collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON body")
}

/// Logs in and returns the `name=token` pair from the Set-Cookie header.
async fn login(app: &Router, identifier: &str, password: &str) -> String {
    let response = send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({ "identifier": identifier, "password": password })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Should set session cookie")
        .to_str()
        .expect("Should be ASCII");
    set_cookie
        .split(';')
        .next()
        .expect("Should have cookie pair")
        .to_owned()
}

/// Seeds the stock admin, logs in and passes the step-up challenge.
async fn verified_admin_cookie(app: &Router, users: &UserDirectory) -> String {
    ensure_default_admin(users).expect("Should seed admin");
    let cookie = login(app, "admin", "admin").await;
    let response = send(
        app,
        "POST",
        "/verify",
        Some(&cookie),
        Some(json!({ "code": "246813" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    cookie
}

#[tokio::test]
async fn health_route_is_public() {
    let dir = TempDir::new().expect("Should create temp dir");
    let (app, _users) = test_app(&dir);

    let response = send(&app, "GET", "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["ok"], json!(true));
}

#[tokio::test]
async fn home_distinguishes_anonymous_and_authenticated() {
    let dir = TempDir::new().expect("Should create temp dir");
    let (app, users) = test_app(&dir);
    add_staff_user(&users, "matrona1", Group::Matrona);

    let anon = json_body(send(&app, "GET", "/", None, None).await).await;
    assert_eq!(anon["authenticated"], json!(false));
    assert_eq!(anon["dashboard"], json!("/login"));

    let cookie = login(&app, "matrona1", "secreto123").await;
    let known = json_body(send(&app, "GET", "/", Some(&cookie), None).await).await;
    assert_eq!(known["authenticated"], json!(true));
    assert_eq!(known["display_role"], json!("Matrona"));
    assert_eq!(known["dashboard"], json!("/dashboard/matrona"));
}

#[tokio::test]
async fn anonymous_namespace_request_redirects_to_login_with_next() {
    let dir = TempDir::new().expect("Should create temp dir");
    let (app, _users) = test_app(&dir);

    let response = send(&app, "GET", "/gestion/personas", None, None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("Should redirect")
        .to_str()
        .expect("Should be ASCII");
    assert_eq!(location, "/login?next=/gestion/personas");
}

#[tokio::test]
async fn unknown_identifier_and_wrong_password_fail_alike() {
    let dir = TempDir::new().expect("Should create temp dir");
    let (app, users) = test_app(&dir);
    add_staff_user(&users, "tens1", Group::Tens);

    let unknown = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "identifier": "nadie", "password": "x" })),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_body = json_body(unknown).await;

    let wrong = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "identifier": "tens1", "password": "mala" })),
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong_body = json_body(wrong).await;

    assert_eq!(unknown_body["message"], wrong_body["message"]);
}

#[tokio::test]
async fn disabled_account_cannot_log_in() {
    let dir = TempDir::new().expect("Should create temp dir");
    let (app, users) = test_app(&dir);
    add_staff_user(&users, "medico1", Group::Medico);
    users.deactivate("medico1").expect("Should deactivate");

    let response = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "identifier": "medico1", "password": "secreto123" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["ok"], json!(false));
}

#[tokio::test]
async fn wrong_group_namespace_is_denied() {
    let dir = TempDir::new().expect("Should create temp dir");
    let (app, users) = test_app(&dir);
    add_staff_user(&users, "matrona1", Group::Matrona);
    let cookie = login(&app, "matrona1", "secreto123").await;

    let response = send(&app, "GET", "/gestion/usuarios", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["error"], json!("forbidden"));
    assert!(body["detail"]
        .as_str()
        .expect("Should have detail")
        .contains("Administrador"));
}

#[tokio::test]
async fn admin_manages_the_user_directory() {
    let dir = TempDir::new().expect("Should create temp dir");
    let (app, users) = test_app(&dir);
    add_staff_user(&users, "tens1", Group::Tens);
    let cookie = verified_admin_cookie(&app, &users).await;

    let response = send(&app, "GET", "/gestion/usuarios/tens1", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["username"], json!("tens1"));
    assert_eq!(body["display_role"], json!("TENS"));

    let response = send(
        &app,
        "POST",
        "/gestion/usuarios/tens1/deactivate",
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["active"], json!(false));

    let response = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "identifier": "tens1", "password": "secreto123" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, "GET", "/gestion/usuarios/nadie", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dashboard_handlers_enforce_group_membership() {
    let dir = TempDir::new().expect("Should create temp dir");
    let (app, users) = test_app(&dir);
    add_staff_user(&users, "matrona1", Group::Matrona);
    let cookie = login(&app, "matrona1", "secreto123").await;

    let own = send(&app, "GET", "/dashboard/matrona", Some(&cookie), None).await;
    assert_eq!(own.status(), StatusCode::OK);
    let body = json_body(own).await;
    assert_eq!(body["fichas_activas"], json!(0));

    let other = send(&app, "GET", "/dashboard/admin", Some(&cookie), None).await;
    assert_eq!(other.status(), StatusCode::FORBIDDEN);

    let anon = send(&app, "GET", "/dashboard/matrona", None, None).await;
    assert_eq!(anon.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_step_up_gates_namespaces_until_verified() {
    let dir = TempDir::new().expect("Should create temp dir");
    let (app, users) = test_app(&dir);
    ensure_default_admin(&users).expect("Should seed admin");
    let cookie = login(&app, "admin", "admin").await;

    let gated = send(&app, "GET", "/gestion/usuarios", Some(&cookie), None).await;
    assert_eq!(gated.status(), StatusCode::SEE_OTHER);
    let location = gated
        .headers()
        .get(header::LOCATION)
        .expect("Should redirect")
        .to_str()
        .expect("Should be ASCII");
    assert_eq!(location, "/verify");

    // First submitted code becomes the enrolled factor.
    let enrol = send(
        &app,
        "POST",
        "/verify",
        Some(&cookie),
        Some(json!({ "code": "246813" })),
    )
    .await;
    assert_eq!(enrol.status(), StatusCode::OK);

    let open = send(&app, "GET", "/gestion/usuarios", Some(&cookie), None).await;
    assert_eq!(open.status(), StatusCode::OK);

    // A fresh login starts unverified and must repeat the challenge.
    let second = login(&app, "admin", "admin").await;
    let wrong = send(
        &app,
        "POST",
        "/verify",
        Some(&second),
        Some(json!({ "code": "000000" })),
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::FORBIDDEN);
    let right = send(
        &app,
        "POST",
        "/verify",
        Some(&second),
        Some(json!({ "code": "246813" })),
    )
    .await;
    assert_eq!(right.status(), StatusCode::OK);
}

#[tokio::test]
async fn persona_creation_validates_the_rut() {
    let dir = TempDir::new().expect("Should create temp dir");
    let (app, users) = test_app(&dir);
    let cookie = verified_admin_cookie(&app, &users).await;

    let response = send(
        &app,
        "POST",
        "/gestion/personas",
        Some(&cookie),
        Some(json!({
            "rut": "12.345.678-9",
            "nombre": "Ana",
            "apellido_paterno": "Rojas",
            "apellido_materno": "Soto",
            "fecha_nacimiento": "1995-04-12",
            "sexo": "femenino"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn clinical_record_flow_across_namespaces() {
    let dir = TempDir::new().expect("Should create temp dir");
    let (app, users) = test_app(&dir);
    let admin = verified_admin_cookie(&app, &users).await;
    add_staff_user(&users, "matrona1", Group::Matrona);
    add_staff_user(&users, "tens1", Group::Tens);
    let matrona = login(&app, "matrona1", "secreto123").await;
    let tens = login(&app, "tens1", "secreto123").await;

    let persona = send(
        &app,
        "POST",
        "/gestion/personas",
        Some(&admin),
        Some(json!({
            "rut": "12.345.678-5",
            "nombre": "Ana",
            "apellido_paterno": "Rojas",
            "apellido_materno": "Soto",
            "fecha_nacimiento": "1995-04-12",
            "sexo": "femenino"
        })),
    )
    .await;
    assert_eq!(persona.status(), StatusCode::CREATED);
    let persona = json_body(persona).await;
    // Stored in canonical separator-free form.
    assert_eq!(persona["rut"], json!("123456785"));

    let paciente = send(
        &app,
        "POST",
        "/matrona/pacientes",
        Some(&matrona),
        Some(json!({
            "persona_id": persona["id"],
            "grupo_sanguineo": "O+",
            "alergias": "penicilina"
        })),
    )
    .await;
    assert_eq!(paciente.status(), StatusCode::CREATED);
    let paciente = json_body(paciente).await;
    assert_eq!(paciente["activo"], json!(true));

    let ingreso = send(
        &app,
        "POST",
        "/matrona/ingresos",
        Some(&matrona),
        Some(json!({
            "paciente_id": paciente["id"],
            "fecha_ingreso": "2026-08-06T10:30:00Z",
            "motivo": "Trabajo de parto",
            "semanas_gestacion": 38,
            "paridad": 1
        })),
    )
    .await;
    assert_eq!(ingreso.status(), StatusCode::CREATED);
    let ingreso = json_body(ingreso).await;
    assert_eq!(ingreso["activa"], json!(true));

    let administracion = send(
        &app,
        "POST",
        "/tens/administraciones",
        Some(&tens),
        Some(json!({
            "ingreso_id": ingreso["id"],
            "medicamento": "Oxitocina",
            "dosis": "10 UI",
            "fecha_hora_administracion": "2026-08-06T11:00:00Z"
        })),
    )
    .await;
    assert_eq!(administracion.status(), StatusCode::CREATED);
    let administracion = json_body(administracion).await;
    // The recorder is always the session identity, never client input.
    assert_eq!(administracion["administrado_por"], json!("tens1"));

    let ingreso_id = ingreso["id"].as_str().expect("Should have id");
    let closed = send(
        &app,
        "POST",
        &format!("/matrona/ingresos/{ingreso_id}/close"),
        Some(&matrona),
        None,
    )
    .await;
    assert_eq!(closed.status(), StatusCode::OK);
    let closed = json_body(closed).await;
    assert_eq!(closed["activa"], json!(false));
}

#[tokio::test]
async fn medico_manages_the_pathology_catalogue() {
    let dir = TempDir::new().expect("Should create temp dir");
    let (app, users) = test_app(&dir);
    add_staff_user(&users, "medico1", Group::Medico);
    let cookie = login(&app, "medico1", "secreto123").await;

    let created = send(
        &app,
        "POST",
        "/medico/patologias",
        Some(&cookie),
        Some(json!({
            "nombre": "Preeclampsia",
            "descripcion": "Hipertensión inducida por el embarazo",
            "nivel_riesgo": "alto"
        })),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = json_body(created).await;
    assert_eq!(created["nivel_riesgo"], json!("alto"));

    let id = created["id"].as_str().expect("Should have id");
    let updated = send(
        &app,
        "PUT",
        &format!("/medico/patologias/{id}/nivel"),
        Some(&cookie),
        Some(json!({ "nivel_riesgo": "critico" })),
    )
    .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let updated = json_body(updated).await;
    assert_eq!(updated["nivel_riesgo"], json!("critico"));

    let bad = send(
        &app,
        "PUT",
        &format!("/medico/patologias/{id}/nivel"),
        Some(&cookie),
        Some(json!({ "nivel_riesgo": "gravisimo" })),
    )
    .await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let dir = TempDir::new().expect("Should create temp dir");
    let (app, users) = test_app(&dir);
    add_staff_user(&users, "matrona1", Group::Matrona);
    let cookie = login(&app, "matrona1", "secreto123").await;

    let response = send(&app, "POST", "/logout", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Should clear cookie")
        .to_str()
        .expect("Should be ASCII");
    assert!(cleared.contains("Max-Age=0"));

    let home = json_body(send(&app, "GET", "/", Some(&cookie), None).await).await;
    assert_eq!(home["authenticated"], json!(false));
}

#[tokio::test]
async fn unknown_paths_fall_through_to_404() {
    let dir = TempDir::new().expect("Should create temp dir");
    let (app, _users) = test_app(&dir);

    let response = send(&app, "GET", "/inexistente", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
