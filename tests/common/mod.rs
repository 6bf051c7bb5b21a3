//! Common test utilities for E2E tests

use tempfile::TempDir;
use todoboard::auth::{Session, create_session_token};
use todoboard::{AppState, build_router, config};
use tokio::net::TcpListener;

pub const TEST_SESSION_SECRET: &str = "test-secret-key-32-bytes-long!!!";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server with the todo variant enabled
    pub async fn new() -> Self {
        Self::with_show_todos(true).await
    }

    /// Create a new test server instance
    pub async fn with_show_todos(show_todos: bool) -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            database: config::DatabaseConfig {
                path: db_path.clone(),
            },
            auth: config::AuthConfig {
                session_secret: TEST_SESSION_SECRET.to_string(),
                session_max_age: 604800,
                provider: config::ProviderConfig {
                    domain: "test-tenant.example.auth0.com".to_string(),
                    client_id: "test-client-id".to_string(),
                    client_secret: "test-client-secret".to_string(),
                },
            },
            page: config::PageConfig {
                title: "Test Todoboard".to_string(),
                show_todos,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config.clone()).await.unwrap();

        // Create HTTP client that does not follow the auth redirects
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Mint a valid session cookie for the given user
    pub fn session_cookie(&self, name: &str, subject: &str) -> String {
        let session = Session::new(subject.to_string(), name.to_string(), 3600);
        let token = create_session_token(&session, TEST_SESSION_SECRET).unwrap();
        format!("session={token}")
    }

    /// Seed todos into the store, in order
    pub async fn seed_todos(&self, contents: &[&str]) {
        for content in contents {
            self.state.db.insert_todo(content).await.unwrap();
        }
    }

    /// Make every subsequent todo read fail
    ///
    /// Drops the todos table through a second connection to the server's
    /// database file, leaving the running server's pool pointing at a
    /// store that errors on read.
    pub async fn break_todo_store(&self) {
        let db_path = self._temp_dir.path().join("test.db");
        let pool = sqlx::SqlitePool::connect(&format!("sqlite:{}", db_path.display()))
            .await
            .unwrap();
        sqlx::query("DROP TABLE todos").execute(&pool).await.unwrap();
        pool.close().await;
    }
}
