use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

use vitrina_api::config::AppConfig;
use vitrina_auth::{JwtClaims, Role};
use vitrina_core::UserId;

const JWT_SECRET: &str = "test-secret";
const ADMIN_EMAIL: &str = "admin@tienda.es";
const ADMIN_PASSWORD: &str = "Secreta123";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory backends, ephemeral port.
        let config = AppConfig::new(JWT_SECRET).with_seed_admin(ADMIN_EMAIL, ADMIN_PASSWORD);
        let app = vitrina_api::app::build_app(config).await.expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, client: reqwest::Client::new(), handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut req = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn delete(&self, path: &str, token: &str) -> (StatusCode, Value) {
        let res = self.client.delete(self.url(path)).bearer_auth(token).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn login(&self) -> String {
        let (status, body) = self
            .post("/auth/login", None, json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(roles: Vec<Role>) -> String {
    let claims = JwtClaims::new(UserId::new(), "tester@tienda.es", roles, Utc::now(), ChronoDuration::minutes(10));

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn id(body: &Value) -> i64 {
    body["id"].as_i64().unwrap_or_else(|| panic!("no id in {body}"))
}

#[tokio::test]
async fn auth_required_for_admin_endpoints() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let (status, _) = srv.get("/admin/families", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = srv.get("/admin/families", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_issues_a_usable_token() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv
        .post("/auth/login", None, json!({ "email": ADMIN_EMAIL, "password": "otra-cosa" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Email o contraseña incorrectos");

    let token = srv.login().await;
    let (status, me) = srv.get("/admin/whoami", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], ADMIN_EMAIL);
    assert!(me["roles"].as_array().unwrap().iter().any(|r| r == "admin"));

    let (status, profile) = srv.get("/admin/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["full_name"], "Administrador");
}

#[tokio::test]
async fn catalog_reaches_the_storefront() {
    let srv = TestServer::spawn().await;
    let token = srv.login().await;
    let t = Some(token.as_str());

    let (_, family) = srv.post("/admin/families", t, json!({ "name": "Ropa" })).await;
    let (_, category) = srv
        .post("/admin/categories", t, json!({ "name": "Camisetas", "family_id": id(&family) }))
        .await;
    let (status, sub) = srv
        .post("/admin/subcategories", t, json!({ "name": "Manga corta", "category_id": id(&category) }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, color) = srv.post("/admin/options", t, json!({ "name": "Color" })).await;
    for value in ["Rojo", "Azul"] {
        let (status, _) = srv
            .post("/admin/features", t, json!({ "value": value, "option_id": id(&color) }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, stubs) = srv
        .post("/admin/variants/generate", t, json!({ "option_ids": [id(&color)], "base_price": 1500 }))
        .await;
    assert_eq!(status, StatusCode::OK, "{stubs}");
    let variants: Vec<Value> = stubs
        .as_array()
        .unwrap()
        .iter()
        .map(|s| json!({ "feature_ids": s["feature_ids"], "price": s["price"], "stock": 5 }))
        .collect();
    assert_eq!(variants.len(), 2);

    let (status, product) = srv
        .post(
            "/admin/products",
            t,
            json!({
                "basic_info": {
                    "name": "Camiseta básica",
                    "sku": "CAM-001",
                    "price": 1500,
                    "subcategory_id": id(&sub),
                },
                "selected_options": [id(&color)],
                "variants": variants,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{product}");

    let (status, page) = srv.get(&format!("/products?subcategoria={}", id(&sub)), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = &page["products"][0];
    assert_eq!(listed["name"], "Camiseta básica");
    assert_eq!(listed["has_stock"], true);
    assert_eq!(page["has_more"], false);

    let slug = listed["slug"].as_str().unwrap();
    let (status, detail) = srv.get(&format!("/products/{slug}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["variants"].as_array().unwrap().len(), 2);

    let (_, count) = srv.get("/products/count?precioMin=20", None).await;
    assert_eq!(count["count"], 0);

    let (status, sitemap) = srv.get("/sitemap", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sitemap.as_array().unwrap().len(), 2);

    let (_, dashboard) = srv.get("/admin/dashboard/stats", t).await;
    assert_eq!(dashboard["total_products"], 1);
    assert_eq!(dashboard["total_stock"], 10);
}

#[tokio::test]
async fn blocked_delete_is_a_conflict() {
    let srv = TestServer::spawn().await;
    let token = srv.login().await;

    let (_, family) = srv.post("/admin/families", Some(&token), json!({ "name": "Hogar" })).await;
    srv.post("/admin/categories", Some(&token), json!({ "name": "Cocina", "family_id": id(&family) }))
        .await;

    let (status, body) = srv.delete(&format!("/admin/families/{}", id(&family)), &token).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "No se puede eliminar una familia con categorías");

    let (status, _) = srv.delete("/admin/families/abc", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn editor_cannot_manage_users() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(vec![Role::EDITOR]);

    let (status, _) = srv.get("/admin/families", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = srv.get("/admin/users", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn admin_creates_and_lists_users() {
    let srv = TestServer::spawn().await;
    let token = srv.login().await;

    let new_user = json!({
        "email": "ana@tienda.es",
        "password": "Secreta123",
        "confirm_password": "Secreta123",
        "full_name": "Ana García",
    });
    let (status, created) = srv.post("/admin/users", Some(&token), new_user.clone()).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");

    let (status, body) = srv.post("/admin/users", Some(&token), new_user).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Este email ya está registrado");

    let (_, users) = srv.get("/admin/users", Some(&token)).await;
    let emails: Vec<&str> = users.as_array().unwrap().iter().filter_map(|u| u["email"].as_str()).collect();
    assert!(emails.contains(&"ana@tienda.es"));
    assert!(emails.contains(&ADMIN_EMAIL));
}

#[tokio::test]
async fn malformed_slug_is_rejected() {
    let srv = TestServer::spawn().await;
    let (status, body) = srv.get("/products/no-id-here-xyz", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");
}
