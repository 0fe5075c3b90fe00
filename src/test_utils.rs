use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::mailer::{MailError, Mailer, OutgoingMail};
use crate::router::create_router;
use crate::schemas::AppState;

/// Mailer that keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().expect("mailer lock poisoned").clone()
    }

    /// The code contained in the most recent message.
    pub fn last_code(&self) -> Option<i32> {
        let sent = self.sent();
        let body = &sent.last()?.html_body;
        let digits: String = body
            .split("access code is ")
            .nth(1)?
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        self.sent.lock().expect("mailer lock poisoned").push(mail);
        Ok(())
    }
}

/// Mailer whose every delivery fails.
#[derive(Debug, Default)]
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _mail: OutgoingMail) -> Result<(), MailError> {
        Err(MailError::Delivery("relay unavailable".to_string()))
    }
}

/// Create an in-memory SQLite database for testing
pub async fn setup_test_db() -> DatabaseConnection {
    // A single connection keeps every query on the same in-memory database
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory database");

    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");

    // Run migrations
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level is determined by the RUST_LOG environment variable,
/// defaulting to WARN if not set.
fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| match level.to_uppercase().as_str() {
            "ERROR" => Some(Level::ERROR),
            "WARN" => Some(Level::WARN),
            "INFO" => Some(Level::INFO),
            "DEBUG" => Some(Level::DEBUG),
            "TRACE" => Some(Level::TRACE),
            _ => None,
        })
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Test server backed by a fresh database, plus handles to inspect it.
pub struct TestApp {
    pub server: TestServer,
    pub db: DatabaseConnection,
    pub mailer: Arc<RecordingMailer>,
}

/// Create a test server with a recording mailer
pub async fn setup_test_app() -> TestApp {
    let _guard = init_test_tracing();

    let db = setup_test_db().await;
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState {
        db: db.clone(),
        mailer: mailer.clone(),
    };

    let server = TestServer::new(create_router(state, Duration::from_secs(30)))
        .expect("Failed to start test server");

    TestApp { server, db, mailer }
}

/// Create a test server whose mail delivery always fails
pub async fn setup_test_app_with_failing_mailer() -> (TestServer, DatabaseConnection) {
    let _guard = init_test_tracing();

    let db = setup_test_db().await;
    let state = AppState {
        db: db.clone(),
        mailer: Arc::new(FailingMailer),
    };

    let server = TestServer::new(create_router(state, Duration::from_secs(30)))
        .expect("Failed to start test server");

    (server, db)
}
