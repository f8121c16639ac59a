//! Spins up the real web service on an ephemeral port for end to end tests.

use std::net::SocketAddr;

use db_service::{test_support::seed_products, DbService};
use shared_lib::structs::DatabaseConfig;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use web_service::{
    get_main_router, verification::compute_signature, verification::HMAC_HEADER, AppState,
    SharedAppState, SHOPIFY_ORDER_PATH,
};

pub const SECRET: &str = "integration-secret";

pub fn setup() {
    dotenv::dotenv().ok();
    let _ = tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: SharedAppState,
    pub client: reqwest::Client,
    _dir: tempfile::TempDir,
}

impl TestServer {
    pub async fn start(products: &[(&str, i64)]) -> Self {
        setup();

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = DatabaseConfig::Local {
            path: dir.path().join("orders.db").to_string_lossy().to_string(),
        };
        let db = DbService::connect(&config)
            .await
            .expect("Failed to open db");
        db.init_tables().await.expect("Failed to create tables");
        tracing::info!("Seeding {} product(s) into {}", products.len(), config);
        seed_products(&db, products)
            .await
            .expect("Failed to seed products");

        let state = AppState::new(db, Some(SECRET.to_string()));
        let listen: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let server = axum::Server::bind(&listen)
            .serve(get_main_router(state.clone()).into_make_service());
        let addr = server.local_addr();
        tokio::spawn(server);
        tracing::info!("Test server listening on {}", addr);

        TestServer {
            addr,
            state,
            client: reqwest::Client::new(),
            _dir: dir,
        }
    }

    pub async fn post_order(&self, body: &str, signature: Option<String>) -> (u16, String) {
        let mut request = self
            .client
            .post(format!("http://{}{}", self.addr, SHOPIFY_ORDER_PATH))
            .header("content-type", "application/json")
            .body(body.to_string());
        if let Some(signature) = signature {
            request = request.header(HMAC_HEADER, signature);
        }

        let response = request.send().await.expect("Failed to send webhook");
        let status = response.status().as_u16();
        let text = response.text().await.expect("Failed to read response");
        (status, text)
    }

    pub async fn stock(&self, sku: &str) -> Option<i64> {
        self.state.db.get_stock(sku).await.expect("Failed to read stock")
    }
}

pub fn sign(body: &str) -> Option<String> {
    Some(compute_signature(body.as_bytes(), SECRET).expect("Failed to sign body"))
}

