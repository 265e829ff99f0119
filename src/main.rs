// src/main.rs

use std::net::SocketAddr;

use chrono::{Duration, Utc};
use dotenvy::dotenv;
use exam_portal::config::Config;
use exam_portal::models::question::{Question, QuestionOption};
use exam_portal::routes;
use exam_portal::session::SessionManager;
use exam_portal::state::AppState;
use exam_portal::store::ExamStore;
use exam_portal::utils::hash::hash_password;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // The whole portal lives in this one in-memory store: fresh at every
    // start, gone at every stop.
    let store = ExamStore::new();

    // Seed Admin User
    if let Err(e) = seed_admin_user(&store, &config) {
        tracing::error!("Failed to seed admin user: {:?}", e);
    }

    if config.seed_demo_data {
        seed_demo_exams(&store);
    }

    // Create AppState
    let state = AppState {
        store,
        sessions: SessionManager::new(),
        config,
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Exam portal listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}

fn seed_admin_user(store: &ExamStore, config: &Config) -> Result<(), exam_portal::error::AppError> {
    if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) {
        if store.find_user_by_username(username).is_none() {
            tracing::info!("Seeding admin user: {}", username);
            let hashed_password = hash_password(password)?;
            store.create_user(username, &hashed_password, "admin")?;
            tracing::info!("Admin user created successfully.");
        }
    }
    Ok(())
}

/// Seeds the demo schedule: one exam for tomorrow, one open now and one
/// in the past. Question content is placeholder text with a fixed answer
/// pattern, so demo grading stays deterministic.
fn seed_demo_exams(store: &ExamStore) {
    let now = Utc::now();

    store.seed_exam(
        "Introduction to Computer Science",
        "Computer Science",
        now + Duration::days(1),
        60,
        demo_questions("Introduction to Computer Science", 30),
    );
    store.seed_exam(
        "Advanced Mathematics",
        "Mathematics",
        now,
        90,
        demo_questions("Advanced Mathematics", 40),
    );
    store.seed_exam(
        "English Literature",
        "English",
        now - Duration::days(3),
        45,
        demo_questions("English Literature", 25),
    );

    tracing::info!("Demo exams seeded.");
}

fn demo_questions(exam_title: &str, count: usize) -> Vec<Question> {
    const OPTION_IDS: [&str; 4] = ["a", "b", "c", "d"];

    (1..=count)
        .map(|i| Question {
            id: i as i64,
            text: format!("Sample question {} for {} exam?", i, exam_title),
            options: OPTION_IDS
                .iter()
                .map(|id| QuestionOption {
                    id: id.to_string(),
                    text: format!("Option {} for question {}", id.to_uppercase(), i),
                })
                .collect(),
            // Fixed rotation instead of a random key: demo data must grade
            // the same way on every run.
            correct_option_id: OPTION_IDS[(i - 1) % OPTION_IDS.len()].to_string(),
            explanation: None,
        })
        .collect()
}
