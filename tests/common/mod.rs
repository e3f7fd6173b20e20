#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, Request, StatusCode,
    },
    routing::get,
    Router,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower::ServiceExt;

use coffee_shop_api::auth::{AuthGate, JwkSet, KeySource, StaticKeys};
use coffee_shop_api::config::{AppConfig, AuthConfig};
use coffee_shop_api::database::models::{Drink, DrinkChanges, NewDrink, Recipe};
use coffee_shop_api::database::{DatabaseError, DrinkRepository};
use coffee_shop_api::AppState;

pub const PRIVATE_KEY: &str = include_str!("../fixtures/test_rsa.pem");
pub const JWKS: &str = include_str!("../fixtures/jwks.json");
pub const KID: &str = "test-key";
pub const AUDIENCE: &str = "coffee";
pub const ISSUER: &str = "https://coffee.test/";

pub const ALL_PERMISSIONS: [&str; 4] = [
    "get:drinks-detail",
    "post:drinks",
    "patch:drinks",
    "delete:drinks",
];

pub fn claims(permissions: &[&str]) -> Value {
    json!({
        "sub": "auth0|manager",
        "aud": AUDIENCE,
        "iss": ISSUER,
        "iat": chrono::Utc::now().timestamp(),
        "exp": chrono::Utc::now().timestamp() + 3600,
        "permissions": permissions,
    })
}

pub fn sign(kid: Option<&str>, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).expect("test key");
    encode(&header, claims, &key).expect("sign token")
}

pub fn token(permissions: &[&str]) -> String {
    sign(Some(KID), &claims(permissions))
}

pub fn manager_token() -> String {
    token(&ALL_PERMISSIONS)
}

pub fn static_keys() -> StaticKeys {
    let set: JwkSet = serde_json::from_str(JWKS).expect("jwks fixture");
    StaticKeys::from_jwks(&set)
}

pub fn test_config(jwks_url: &str) -> AppConfig {
    let auth = AuthConfig {
        jwks_url: jwks_url.to_string(),
        issuer: ISSUER.to_string(),
        audience: AUDIENCE.to_string(),
        jwks_timeout_secs: 2,
        jwks_cache_ttl_secs: 600,
        jwks_refresh_cooldown_secs: 30,
    };
    AppConfig::development(auth)
}

/// In-memory drink table with the same contract as the Postgres repository.
/// Recipes are kept as serialized text, like the real column.
#[derive(Default)]
pub struct MemoryDrinks {
    store: Mutex<Store>,
    failing: AtomicBool,
}

#[derive(Default)]
struct Store {
    last_id: i32,
    rows: BTreeMap<i32, (String, String)>,
}

impl MemoryDrinks {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), DatabaseError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }

    pub async fn seed(&self, title: &str, recipe: Value) -> i32 {
        let mut store = self.store.lock().await;
        store.last_id += 1;
        let id = store.last_id;
        store.rows.insert(id, (title.to_string(), recipe.to_string()));
        id
    }

    pub async fn raw_recipe(&self, id: i32) -> Option<String> {
        self.store.lock().await.rows.get(&id).map(|(_, recipe)| recipe.clone())
    }

    pub async fn count(&self) -> usize {
        self.store.lock().await.rows.len()
    }
}

fn to_drink(id: i32, title: &str, recipe: &str) -> Result<Drink, DatabaseError> {
    let recipe = Recipe::from_json(recipe).map_err(|source| DatabaseError::CorruptRecipe { id, source })?;
    Ok(Drink {
        id,
        title: title.to_string(),
        recipe,
    })
}

fn title_taken(store: &Store, title: &str, except: Option<i32>) -> bool {
    store
        .rows
        .iter()
        .any(|(id, (t, _))| t == title && Some(*id) != except)
}

#[async_trait]
impl DrinkRepository for MemoryDrinks {
    async fn list(&self) -> Result<Vec<Drink>, DatabaseError> {
        self.check()?;
        let store = self.store.lock().await;
        store
            .rows
            .iter()
            .map(|(id, (title, recipe))| to_drink(*id, title, recipe))
            .collect()
    }

    async fn get(&self, id: i32) -> Result<Option<Drink>, DatabaseError> {
        self.check()?;
        let store = self.store.lock().await;
        store
            .rows
            .get(&id)
            .map(|(title, recipe)| to_drink(id, title, recipe))
            .transpose()
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, DatabaseError> {
        self.check()?;
        let recipe = drink.recipe.to_json()?;
        let mut store = self.store.lock().await;
        if title_taken(&store, &drink.title, None) {
            return Err(DatabaseError::UniqueViolation(format!("title {}", drink.title)));
        }
        store.last_id += 1;
        let id = store.last_id;
        store.rows.insert(id, (drink.title.clone(), recipe.clone()));
        to_drink(id, &drink.title, &recipe)
    }

    async fn update(&self, id: i32, changes: DrinkChanges) -> Result<Drink, DatabaseError> {
        self.check()?;
        let recipe = changes.recipe.as_ref().map(Recipe::to_json).transpose()?;
        let mut store = self.store.lock().await;
        if let Some(title) = &changes.title {
            if title_taken(&store, title, Some(id)) {
                return Err(DatabaseError::UniqueViolation(format!("title {}", title)));
            }
        }
        let row = store
            .rows
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("drink {}", id)))?;
        if let Some(title) = changes.title {
            row.0 = title;
        }
        if let Some(recipe) = recipe {
            row.1 = recipe;
        }
        let (title, recipe) = row.clone();
        to_drink(id, &title, &recipe)
    }

    async fn delete(&self, id: i32) -> Result<(), DatabaseError> {
        self.check()?;
        let mut store = self.store.lock().await;
        store
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("drink {}", id)))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.check()
    }
}

pub struct TestApp {
    pub router: Router,
    pub drinks: Arc<MemoryDrinks>,
}

impl TestApp {
    /// Router backed by in-memory drinks and the fixed test key pair
    pub fn new() -> Self {
        Self::with_keys(Arc::new(static_keys()), "http://127.0.0.1:1/.well-known/jwks.json")
    }

    pub fn with_keys(keys: Arc<dyn KeySource>, jwks_url: &str) -> Self {
        let config = test_config(jwks_url);
        let drinks = Arc::new(MemoryDrinks::default());
        let gate = AuthGate::from_config(keys, &config.auth);
        let state = AppState::new(config, drinks.clone(), gate);

        Self {
            router: coffee_shop_api::app(state),
            drinks,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        self.send_request(builder.body(body).expect("request")).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    /// Serve the router on a free local port and return its base URL
    pub async fn spawn(&self) -> anyhow::Result<String> {
        let port = portpicker::pick_unused_port().ok_or_else(|| anyhow::anyhow!("no free port"))?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let router = self.router.clone();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Ok(format!("http://127.0.0.1:{}", port))
    }

    /// Request with a raw Authorization header value
    pub async fn send_with_header(&self, method: Method, uri: &str, authorization: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(AUTHORIZATION, authorization)
            .body(Body::empty())
            .expect("request");
        self.send_request(request).await
    }
}

pub fn latte() -> Value {
    json!([
        {"name": "espresso", "color": "brown", "parts": 1},
        {"name": "milk", "color": "white", "parts": 3}
    ])
}

pub fn water() -> Value {
    json!([{"name": "water", "color": "blue", "parts": 1}])
}

/// Serve the fixture key set over HTTP on a free port, counting fetches
pub struct JwksServer {
    pub url: String,
    pub hits: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl JwksServer {
    pub async fn spawn() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let failing = Arc::new(AtomicBool::new(false));

        let counter = hits.clone();
        let fail = failing.clone();
        let router = Router::new().route(
            "/.well-known/jwks.json",
            get(move || {
                let counter = counter.clone();
                let fail = fail.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if fail.load(Ordering::SeqCst) {
                        (StatusCode::INTERNAL_SERVER_ERROR, [(CONTENT_TYPE, "text/plain")], "down")
                    } else {
                        (StatusCode::OK, [(CONTENT_TYPE, "application/json")], JWKS)
                    }
                }
            }),
        );

        let port = portpicker::pick_unused_port().expect("free port");
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .expect("bind jwks server");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            url: format!("http://127.0.0.1:{}/.well-known/jwks.json", port),
            hits,
            failing,
        }
    }

    pub fn fetches(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}
