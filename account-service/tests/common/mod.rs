#![allow(dead_code)]

use std::sync::Arc;

use account_service::domain::account::service::AccountService;
use account_service::inbound::http::router::create_router;
use account_service::logging::AccountLogRegistry;
use account_service::outbound::repositories::InMemoryAccountRepository;
use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenManager;
use serde_json::json;
use serde_json::Value;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const ACCESS_TTL_HOURS: i64 = 24;

/// Test application that spawns a real server backed by the in-memory store
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub token_manager: TokenManager,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener
            .local_addr()
            .expect("Failed to read local address")
            .port();
        let address = format!("http://127.0.0.1:{}", port);

        let authenticator = Arc::new(
            Authenticator::new(JWT_SECRET, access_ttl())
                .with_password_hasher(
                    PasswordHasher::with_cost(8, 1, 1).expect("Failed to build hasher"),
                ),
        );
        let account_service = Arc::new(AccountService::new(
            Arc::new(InMemoryAccountRepository::new()),
            Arc::clone(&authenticator),
            Arc::new(AccountLogRegistry::disabled()),
        ));

        let router = create_router(account_service, authenticator);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            token_manager: TokenManager::new(JWT_SECRET, access_ttl()),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(format!("{}{}", self.address, path))
    }

    /// Helper to make DELETE request
    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(format!("{}{}", self.address, path))
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        phone: &str,
    ) -> reqwest::Response {
        self.post("/api/auth/register")
            .json(&json!({
                "name": name,
                "email": email,
                "password": password,
                "phone": phone,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn refresh(&self, refresh_token: &str) -> reqwest::Response {
        self.post("/api/auth/refresh")
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register an account and log in, returning the session payload
    pub async fn register_and_login(&self, email: &str, password: &str) -> Value {
        let response = self.register("Alice", email, password, "555-0100").await;
        assert_eq!(response.status(), 201);

        let response = self.login(email, password).await;
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.expect("Failed to parse JSON");
        body["data"].clone()
    }
}

pub fn access_ttl() -> chrono::Duration {
    chrono::Duration::hours(ACCESS_TTL_HOURS)
}

/// Read the bearer tokens out of a session payload
pub fn tokens(session: &Value) -> (String, String) {
    let access = session["tokens"]["access_token"]
        .as_str()
        .expect("access token")
        .to_string();
    let refresh = session["tokens"]["refresh_token"]
        .as_str()
        .expect("refresh token")
        .to_string();
    (access, refresh)
}
