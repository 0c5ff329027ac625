#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::HashCost;
use chrono::Duration;
use chrono::FixedOffset;
use finance_service::domain::expense::errors::ExpenseError;
use finance_service::domain::expense::models::Expense;
use finance_service::domain::expense::models::TimeWindow;
use finance_service::domain::expense::ports::ExpenseRepository;
use finance_service::domain::expense::service::ExpenseService;
use finance_service::domain::user::errors::UserError;
use finance_service::domain::user::models::EmailAddress;
use finance_service::domain::user::models::User;
use finance_service::domain::user::models::UserId;
use finance_service::domain::user::ports::UserRepository;
use finance_service::domain::user::service::UserService;
use finance_service::inbound::http::router::create_router;
use serde_json::json;
use serde_json::Value;
use tokio::sync::RwLock;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// In-memory stand-in for the Postgres user table.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
    unavailable: RwLock<bool>,
}

impl InMemoryUserRepository {
    pub async fn remove(&self, id: &UserId) {
        self.users.write().await.remove(id);
    }

    /// Make every subsequent call fail like an unreachable database.
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }

    async fn check_available(&self) -> Result<(), UserError> {
        if *self.unavailable.read().await {
            return Err(UserError::DatabaseError("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        self.check_available().await?;
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        self.check_available().await?;
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        self.check_available().await?;
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }
}

/// In-memory stand-in for the Postgres expense table.
#[derive(Default)]
pub struct InMemoryExpenseRepository {
    expenses: RwLock<Vec<Expense>>,
}

impl InMemoryExpenseRepository {
    pub async fn insert(&self, expense: Expense) {
        self.expenses.write().await.push(expense);
    }

    pub async fn all(&self) -> Vec<Expense> {
        self.expenses.read().await.clone()
    }

    async fn matching(&self, user_id: &UserId, window: &TimeWindow) -> Vec<Expense> {
        let mut matching: Vec<Expense> = self
            .expenses
            .read()
            .await
            .iter()
            .filter(|expense| &expense.user_id == user_id && window.contains(expense.transaction_at))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.transaction_at.cmp(&a.transaction_at));
        matching
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryExpenseRepository {
    async fn create(&self, expense: Expense) -> Result<Expense, ExpenseError> {
        self.expenses.write().await.push(expense.clone());
        Ok(expense)
    }

    async fn sum_between(
        &self,
        user_id: &UserId,
        window: &TimeWindow,
    ) -> Result<f64, ExpenseError> {
        Ok(self
            .matching(user_id, window)
            .await
            .iter()
            .map(|expense| expense.amount)
            .sum())
    }

    async fn count_between(
        &self,
        user_id: &UserId,
        window: &TimeWindow,
    ) -> Result<u64, ExpenseError> {
        Ok(self.matching(user_id, window).await.len() as u64)
    }

    async fn page_between(
        &self,
        user_id: &UserId,
        window: &TimeWindow,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Expense>, ExpenseError> {
        Ok(self
            .matching(user_id, window)
            .await
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub authenticator: Arc<Authenticator>,
    pub users: Arc<InMemoryUserRepository>,
    pub expenses: Arc<InMemoryExpenseRepository>,
    pub time_zone: FixedOffset,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let authenticator = Arc::new(
            Authenticator::with_hash_cost(
                JWT_SECRET,
                Duration::hours(24),
                HashCost {
                    memory_kib: 256,
                    iterations: 1,
                    parallelism: 1,
                },
            )
            .expect("Failed to create authenticator"),
        );
        let time_zone = FixedOffset::west_opt(3 * 3600).unwrap();

        let users = Arc::new(InMemoryUserRepository::default());
        let expenses = Arc::new(InMemoryExpenseRepository::default());

        let user_service = Arc::new(UserService::new(
            Arc::clone(&users),
            Arc::clone(&authenticator),
        ));
        let expense_service = Arc::new(ExpenseService::new(Arc::clone(&expenses), time_zone));

        let router = create_router(
            user_service,
            expense_service,
            Arc::clone(&authenticator),
            time_zone,
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            authenticator,
            users,
            expenses,
            time_zone,
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

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Register a user and return the response body's `data`.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Value {
        let response = self
            .post("/api/auth/register")
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"].clone()
    }

    /// Register a user and log in, returning `(user id, token)`.
    pub async fn register_and_login(&self, email: &str) -> (String, String) {
        let user = self.register("Test User", email, "password123").await;

        let response = self
            .post("/api/auth/login")
            .json(&json!({ "email": email, "password": "password123" }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.expect("Failed to parse response");
        let token = body["data"]["token"]
            .as_str()
            .expect("token missing")
            .to_string();

        (user["id"].as_str().expect("id missing").to_string(), token)
    }
}
