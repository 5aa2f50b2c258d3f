//! Common test utilities for fasttrack integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};

use fasttrack_service::{create_router, AppState, ServiceConfig};
use fasttrack_store::{Database, SqliteStore};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store behind the server, for rows written outside the API.
    pub store: Arc<SqliteStore>,
}

impl TestHarness {
    /// Create a new test harness with a fresh in-memory database.
    pub async fn new() -> Self {
        let db = Database::in_memory().await.expect("Failed to open database");
        db.initialize().await.expect("Failed to initialize schema");
        let store = Arc::new(SqliteStore::new(db));

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            database_url: "sqlite::memory:".into(),
            db_max_connections: 1,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(store.clone(), config);
        let router: Router = create_router(state);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, store }
    }

    /// Register a customer and return their ID.
    pub async fn register_customer(&self, email: &str) -> i64 {
        let response = self
            .server
            .post("/v1/customers")
            .json(&json!({
                "name": "Hari Prasad",
                "email": email,
                "telephone": "9800000003",
                "password": "secret1"
            }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["id"]
            .as_i64()
            .expect("customer id")
    }

    /// Add a driver and return their ID.
    pub async fn add_driver(&self, name: &str, email: &str) -> i64 {
        let response = self
            .server
            .post("/v1/drivers")
            .json(&json!({
                "name": name,
                "email": email,
                "phone": "9800000001",
                "license_number": "BA-1234",
                "password": "secret1"
            }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["id"].as_i64().expect("driver id")
    }

    /// Book the reference trip for a customer and return the booking body.
    pub async fn book(&self, customer_id: i64) -> Value {
        let response = self
            .server
            .post(&format!("/v1/customers/{customer_id}/bookings"))
            .json(&booking_body())
            .await;
        response.assert_status_ok();
        response.json::<Value>()
    }

    /// Book a trip and return its ID.
    pub async fn book_trip(&self, customer_id: i64) -> i64 {
        self.book(customer_id).await["trip"]["id"]
            .as_i64()
            .expect("trip id")
    }

    /// Assign a driver to a trip through the dispatch endpoint.
    pub async fn assign(&self, trip_id: i64, driver_id: i64) -> Value {
        let response = self
            .server
            .post("/v1/dispatch/assign")
            .json(&json!({ "trip_id": trip_id, "driver_id": driver_id }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()
    }

    /// Fetch a driver's JSON.
    pub async fn driver(&self, driver_id: i64) -> Value {
        let response = self.server.get(&format!("/v1/drivers/{driver_id}")).await;
        response.assert_status_ok();
        response.json::<Value>()
    }

    /// Fetch a trip's JSON.
    pub async fn trip(&self, trip_id: i64) -> Value {
        let response = self.server.get(&format!("/v1/trips/{trip_id}")).await;
        response.assert_status_ok();
        response.json::<Value>()
    }

    /// Run a raw statement, bypassing the API.
    pub async fn raw(&self, sql: &str) {
        sqlx_execute(&self.store, sql).await;
    }
}

async fn sqlx_execute(store: &SqliteStore, sql: &str) {
    sqlx::query(sql)
        .execute(store.pool())
        .await
        .expect("Raw statement failed");
}

/// The reference booking: A to B on 2024-01-01 at 10:00 for 500.
pub fn booking_body() -> Value {
    json!({
        "pickup": "A",
        "dropoff": "B",
        "pickup_date": "2024-01-01",
        "pickup_time": "10:00:00",
        "fare": 500.0
    })
}
