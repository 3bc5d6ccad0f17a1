//! Route-level behaviour through `warp::test`

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use warp::http::StatusCode;

use vet_clinic::auth::{ClaimSet, ManualClock, PasswordHasher, Role, TokenIssuer};
use vet_clinic::handlers::routes;
use vet_clinic::state::AppState;
use vet_clinic::storage::{MemoryObjectStore, MemoryTableStore, Record, Table, TableStore};

const SECRET: &str = "k9Zq2vX7pL4mN8rT1wY6sB3cF5hJ0dGa";
const START: i64 = 1_700_000_000;
const TTL: Duration = Duration::from_secs(30 * 60);

struct Harness {
    store: Arc<MemoryTableStore>,
    objects: Arc<MemoryObjectStore>,
    clock: Arc<ManualClock>,
    issuer: TokenIssuer,
    state: AppState,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(MemoryTableStore::new());
        let objects = Arc::new(MemoryObjectStore::new("http://files.test"));
        let clock = Arc::new(ManualClock::new(START));
        let state = AppState::new(
            store.clone(),
            objects.clone(),
            SECRET,
            TTL,
            clock.clone(),
            "images",
        )
        .unwrap();
        let issuer = TokenIssuer::new(SECRET, TTL, clock.clone());
        Self {
            store,
            objects,
            clock,
            issuer,
            state,
        }
    }

    fn bearer(&self, role: Role) -> String {
        let claims = ClaimSet {
            sub: format!("{}@clinic.com", role.as_str().to_lowercase()),
            role,
            name: role.as_str().to_string(),
            client_id: 1,
        };
        format!("Bearer {}", self.issuer.issue_default(&claims).unwrap())
    }
}

fn row(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => panic!("row must be an object"),
    }
}

fn body_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_root_health_and_headers() {
    let h = Harness::new();
    let api = routes(h.state.clone());

    let resp = warp::test::request().path("/").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp.body())["message"], "API funcionando correctamente");
    assert_eq!(resp.headers()["x-frame-options"], "DENY");

    let resp = warp::test::request().path("/health").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.body().as_ref(), b"OK");
}

#[tokio::test]
async fn test_unknown_path_is_not_found_even_without_token() {
    let h = Harness::new();
    let api = routes(h.state.clone());

    let resp = warp::test::request().path("/no-such-route").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_json(resp.body())["detail"].is_string());
    assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
}

#[tokio::test]
async fn test_missing_or_expired_token_is_unauthorized() {
    let h = Harness::new();
    let api = routes(h.state.clone());

    let resp = warp::test::request().path("/mascotas").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp.body())["detail"], "Token inválido o expirado");

    let admin = h.bearer(Role::Administrator);
    let resp = warp::test::request()
        .path("/dashboard")
        .header("authorization", &admin)
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    h.clock.advance(TTL.as_secs() as i64 + 1);
    for path in ["/dashboard", "/mascotas", "/citas"] {
        let resp = warp::test::request()
            .path(path)
            .header("authorization", &admin)
            .reply(&api)
            .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "path {}", path);
    }
    let stats = h.state.security.event_stats().await;
    assert!(stats.get("token_rejected").copied().unwrap_or(0) >= 4);
}

#[tokio::test]
async fn test_dashboard_is_front_desk_only() {
    let h = Harness::new();
    h.store
        .seed(
            Table::Citas,
            vec![
                row(json!({"id_mascota": 1, "id_veterinario": 3})),
                row(json!({"id_mascota": 2, "id_veterinario": 3})),
                row(json!({"id_mascota": 2, "id_veterinario": 4})),
            ],
        )
        .await;
    h.store.seed(Table::Mascotas, vec![row(json!({"nombre_mascota": "Toby"}))]).await;
    let api = routes(h.state.clone());

    let resp = warp::test::request()
        .path("/dashboard")
        .header("authorization", h.bearer(Role::Veterinarian))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = warp::test::request()
        .path("/dashboard")
        .header("authorization", h.bearer(Role::Receptionist))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let stats = body_json(resp.body());
    assert_eq!(stats["appointment_stats"]["scheduled"], 3);
    assert_eq!(stats["appointment_stats"]["pending"], 3);
    assert_eq!(stats["total_pets"], 1);
    assert_eq!(stats["avg_appointments_per_vet"], 1.5);
}

#[tokio::test]
async fn test_login_route() {
    let h = Harness::new();
    let hash = PasswordHasher::new().hash("pw-cliente-1").unwrap();
    h.store
        .seed(
            Table::Clientes,
            vec![row(json!({"id": 8, "nombre_usuario": "Ana", "correo": "a@x.com", "contraseña": hash}))],
        )
        .await;
    let api = routes(h.state.clone());

    let resp = warp::test::request()
        .method("POST")
        .path("/auth/login")
        .json(&json!({"correo": "a@x.com", "contraseña": "pw-cliente-1", "role": "cliente"}))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp.body());
    assert_eq!(body["token_type"], "bearer");
    let claims = h.state.verifier.verify(body["access_token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.identity.client_id, 8);
    assert_eq!(claims.identity.role, Role::Client);

    let resp = warp::test::request()
        .method("POST")
        .path("/auth/login")
        .json(&json!({"correo": "a@x.com", "contraseña": "wrong", "role": "cliente"}))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp.body())["detail"], "Correo o contraseña incorrectos");

    let resp = warp::test::request()
        .method("POST")
        .path("/auth/login")
        .json(&json!({"correo": "a@x.com", "contraseña": "pw-cliente-1", "role": "admin"}))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_client_listing_hides_secrets() {
    let h = Harness::new();
    let api = routes(h.state.clone());

    let resp = warp::test::request()
        .method("POST")
        .path("/clientes")
        .json(&json!({"nombre_usuario": "Ana", "correo": "a@x.com", "contraseña": "pw-cliente-1"}))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = warp::test::request()
        .path("/clientes")
        .header("authorization", h.bearer(Role::Client))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = warp::test::request()
        .path("/clientes")
        .header("authorization", h.bearer(Role::Receptionist))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let data = body_json(resp.body())["data"].clone();
    assert_eq!(data.as_array().unwrap().len(), 1);
    assert!(data[0].get("contraseña").is_none());
}

#[tokio::test]
async fn test_staff_bootstrap_route() {
    let h = Harness::new();
    let api = routes(h.state.clone());
    let staff = |email: &str, title: &str| {
        json!({"nombre": "Luis", "puesto": title, "correo": email, "contraseña": "pw-staff-1"})
    };

    let resp = warp::test::request()
        .method("POST")
        .path("/funcionarios")
        .json(&staff("admin@clinic.com", "Administrador"))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = warp::test::request()
        .method("POST")
        .path("/funcionarios")
        .json(&staff("vet@clinic.com", "Veterinario"))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = warp::test::request()
        .method("POST")
        .path("/funcionarios")
        .header("authorization", h.bearer(Role::Administrator))
        .json(&staff("vet@clinic.com", "Veterinario"))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(h.store.row_count(Table::Funcionario).await, 2);
}

#[tokio::test]
async fn test_complete_appointment_moves_it_to_history() {
    let h = Harness::new();
    h.store
        .seed(
            Table::Citas,
            vec![row(json!({
                "id": 5, "id_mascota": 2, "fecha_cita": "2024-05-01",
                "id_veterinario": 3, "hora_cita": "10:00"
            }))],
        )
        .await;
    let api = routes(h.state.clone());
    let outcome = json!({"tipo": "Consulta", "motivo": "Control anual", "resultado": "Sano"});

    let resp = warp::test::request()
        .method("POST")
        .path("/citas/5/completar")
        .header("authorization", h.bearer(Role::Receptionist))
        .json(&outcome)
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = warp::test::request()
        .method("POST")
        .path("/citas/5/completar")
        .header("authorization", h.bearer(Role::Veterinarian))
        .json(&outcome)
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(h.store.row_count(Table::Citas).await, 0);

    let history = h
        .store
        .select_eq(Table::Historial, "id_mascota", &json!(2))
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["veterinario_id"], json!(3));
    assert_eq!(history[0]["fecha"], json!("2024-05-01"));
    assert_eq!(history[0]["descripcion"], json!("Control anual"));

    let resp = warp::test::request()
        .path("/citas/veterinario/3")
        .header("authorization", h.bearer(Role::Veterinarian))
        .reply(&api)
        .await;
    assert_eq!(body_json(resp.body())["data"].as_array().unwrap().len(), 1);

    let resp = warp::test::request()
        .method("POST")
        .path("/diagnosticos/citas/5/completar")
        .header("authorization", h.bearer(Role::Administrator))
        .json(&outcome)
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_rows_are_not_found() {
    let h = Harness::new();
    let api = routes(h.state.clone());
    let client = h.bearer(Role::Client);

    let resp = warp::test::request()
        .method("DELETE")
        .path("/citas/99/cancelar")
        .header("authorization", &client)
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = warp::test::request()
        .method("PUT")
        .path("/mascotas/99/editar")
        .header("authorization", &client)
        .json(&json!({
            "nombre_mascota": "Toby", "especie": "Perro", "raza": "Beagle",
            "fecha_nacimiento": "2020-01-01", "id_dueño": 1
        }))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vaccine_association() {
    let h = Harness::new();
    let api = routes(h.state.clone());

    let resp = warp::test::request()
        .method("POST")
        .path("/vacunas/asociar?mascota_id=2&vacuna_id=4")
        .header("authorization", h.bearer(Role::Client))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = warp::test::request()
        .method("POST")
        .path("/vacunas/asociar?mascota_id=2&vacuna_id=4")
        .header("authorization", h.bearer(Role::Veterinarian))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = warp::test::request()
        .path("/vacunas/mascotas/2")
        .header("authorization", h.bearer(Role::Client))
        .reply(&api)
        .await;
    let data = body_json(resp.body())["data"].clone();
    assert_eq!(data[0]["vacuna"], json!(4));
}

fn multipart_body(boundary: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: image/png\r\n\r\n",
        b = boundary,
        f = filename
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

#[tokio::test]
async fn test_pet_image_upload() {
    let h = Harness::new();
    h.store
        .seed(Table::Mascotas, vec![row(json!({"id": 2, "nombre_mascota": "Toby"}))])
        .await;
    let api = routes(h.state.clone());
    let boundary = "clinic-boundary";

    let resp = warp::test::request()
        .method("POST")
        .path("/upload/mascota-image/2")
        .header("authorization", h.bearer(Role::Client))
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(multipart_body(boundary, "toby.png", b"\x89PNG-data"))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let url = body_json(resp.body())["image_url"].as_str().unwrap().to_string();
    assert_eq!(url, "http://files.test/storage/v1/object/public/images/mascotas/2/toby.png");

    let (data, content_type) = h.objects.get_object("images", "mascotas/2/toby.png").await.unwrap();
    assert_eq!(data, b"\x89PNG-data");
    assert_eq!(content_type, "image/png");

    let pet = h.store.select_eq(Table::Mascotas, "id", &json!(2)).await.unwrap();
    assert_eq!(pet[0]["image_url"], json!(url));

    let resp = warp::test::request()
        .method("POST")
        .path("/upload/mascota-image/77")
        .header("authorization", h.bearer(Role::Client))
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(multipart_body(boundary, "toby.png", b"data"))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
