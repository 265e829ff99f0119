// tests/exam_flow_tests.rs
//
// End-to-end exam-taking flow: schedule -> attempt -> answer/navigate ->
// submit -> review, plus the edge cases around double submission and
// attempts on exams that are not open.

use chrono::{Duration, Utc};
use exam_portal::{
    config::Config,
    models::question::{Question, QuestionOption},
    routes,
    session::SessionManager,
    state::AppState,
    store::ExamStore,
};

async fn spawn_app() -> (String, ExamStore) {
    let store = ExamStore::new();

    let config = Config {
        jwt_secret: "flow_test_secret".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_username: None,
        admin_password: None,
        seed_demo_data: false,
    };

    let state = AppState {
        store: store.clone(),
        sessions: SessionManager::new(),
        config,
    };

    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, store)
}

async fn student_token(client: &reqwest::Client, address: &str) -> String {
    let username = format!("s_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let register = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": username,
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(register.status().as_u16(), 201);

    let login: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "username": username,
            "password": "password123"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    login["token"].as_str().unwrap().to_string()
}

fn question(id: i64, correct: &str) -> Question {
    Question {
        id,
        text: format!("Question {}?", id),
        options: ["a", "b", "c", "d"]
            .iter()
            .map(|o| QuestionOption {
                id: o.to_string(),
                text: format!("Option {}", o.to_uppercase()),
            })
            .collect(),
        correct_option_id: correct.to_string(),
        explanation: None,
    }
}

/// An exam that opened a minute ago, with the answer key {a, b, c, d}.
fn seed_open_exam(store: &ExamStore) -> i64 {
    store
        .seed_exam(
            "Basic Physics",
            "Physics",
            Utc::now() - Duration::minutes(1),
            30,
            vec![
                question(1, "a"),
                question(2, "b"),
                question(3, "c"),
                question(4, "d"),
            ],
        )
        .id
}

#[tokio::test]
async fn full_exam_flow_scores_fifty() {
    let (address, store) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = student_token(&client, &address).await;
    let exam_id = seed_open_exam(&store);

    // The exam shows as ongoing.
    let exam: serde_json::Value = client
        .get(format!("{}/api/exams/{}", address, exam_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(exam["status"], "ongoing");

    // Start the attempt.
    let started = client
        .post(format!("{}/api/exams/{}/attempt", address, exam_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(started.status().as_u16(), 201);
    let snapshot: serde_json::Value = started.json().await.unwrap();
    assert_eq!(snapshot["phase"], "active");
    assert_eq!(snapshot["current_index"], 0);
    assert_eq!(snapshot["total_questions"], 4);
    assert_eq!(snapshot["answered_count"], 0);
    assert!(snapshot["remaining_seconds"].as_u64().unwrap() <= 30 * 60);
    // The answer key must not leak into the attempt view.
    assert!(snapshot["current_question"].get("correct_option_id").is_none());

    // Answer q1 correctly, q2 with an off-list option, q3 correctly;
    // q4 stays unanswered.
    for (question_id, option_id) in [(1, "a"), (2, "x"), (3, "c")] {
        let answered = client
            .put(format!("{}/api/exams/{}/attempt/answer", address, exam_id))
            .bearer_auth(&token)
            .json(&serde_json::json!({
                "question_id": question_id,
                "option_id": option_id
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(answered.status().as_u16(), 200);
    }

    // Answering a question that is not part of the exam is rejected.
    let bad_answer = client
        .put(format!("{}/api/exams/{}/attempt/answer", address, exam_id))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "question_id": 99, "option_id": "a" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_answer.status().as_u16(), 400);

    // Navigation: jump, then out-of-range jumps are ignored.
    let goto = |index: i64| {
        let client = client.clone();
        let address = address.clone();
        let token = token.clone();
        async move {
            let response: serde_json::Value = client
                .post(format!("{}/api/exams/{}/attempt/goto", address, exam_id))
                .bearer_auth(&token)
                .json(&serde_json::json!({ "index": index }))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            response["current_index"].as_i64().unwrap()
        }
    };
    assert_eq!(goto(2).await, 2);
    assert_eq!(goto(-1).await, 2);
    assert_eq!(goto(4).await, 2);

    // next clamps at the last question, previous walks back.
    let next: serde_json::Value = client
        .post(format!("{}/api/exams/{}/attempt/next", address, exam_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(next["current_index"], 3);
    let next: serde_json::Value = client
        .post(format!("{}/api/exams/{}/attempt/next", address, exam_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(next["current_index"], 3);
    let previous: serde_json::Value = client
        .post(format!("{}/api/exams/{}/attempt/previous", address, exam_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(previous["current_index"], 2);
    assert_eq!(previous["answered_count"], 3);

    // Submit: 2 of 4 correct -> round(100 * 2/4) = 50.
    let submitted = client
        .post(format!("{}/api/exams/{}/attempt/submit", address, exam_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(submitted.status().as_u16(), 200);
    let result: serde_json::Value = submitted.json().await.unwrap();
    assert_eq!(result["score"], 50);
    assert_eq!(result["correct_answers"], 2);
    assert_eq!(result["total_questions"], 4);
    assert_eq!(result["total_score"], 100);
    assert_eq!(result["answers"].as_array().unwrap().len(), 4);
    let unanswered = &result["answers"][3];
    assert_eq!(unanswered["question_id"], 4);
    assert!(unanswered["selected_option_id"].is_null());
    assert_eq!(unanswered["is_correct"], false);

    // A second submission cannot produce a second result.
    let resubmitted = client
        .post(format!("{}/api/exams/{}/attempt/submit", address, exam_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resubmitted.status().as_u16(), 409);

    // Answer mutation after submission bounces off a dead session.
    let late_answer = client
        .put(format!("{}/api/exams/{}/attempt/answer", address, exam_id))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "question_id": 4, "option_id": "d" }))
        .send()
        .await
        .unwrap();
    assert_eq!(late_answer.status().as_u16(), 404);

    // Review: the result is stored once and the exam is completed.
    let results: serde_json::Value = client
        .get(format!("{}/api/results", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results.as_array().unwrap().len(), 1);

    let by_exam: serde_json::Value = client
        .get(format!("{}/api/results/{}", address, exam_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_exam["score"], 50);

    let exam: serde_json::Value = client
        .get(format!("{}/api/exams/{}", address, exam_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(exam["status"], "completed");
    assert_eq!(exam["score"], 50);

    // Completed exams reveal their answer keys for review.
    let questions: serde_json::Value = client
        .get(format!("{}/api/exams/{}/questions", address, exam_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(questions[0]["correct_option_id"], "a");
}

#[tokio::test]
async fn attempt_requires_an_ongoing_exam() {
    let (address, store) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = student_token(&client, &address).await;

    // Not scheduled yet.
    let upcoming = store.seed_exam(
        "Future Exam",
        "Maths",
        Utc::now() + Duration::days(1),
        60,
        vec![question(1, "a")],
    );
    let response = client
        .post(format!("{}/api/exams/{}/attempt", address, upcoming.id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);

    // Unknown exam.
    let response = client
        .post(format!("{}/api/exams/999/attempt", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn attempt_is_resumed_not_restarted() {
    let (address, store) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = student_token(&client, &address).await;
    let exam_id = seed_open_exam(&store);

    client
        .post(format!("{}/api/exams/{}/attempt", address, exam_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    client
        .put(format!("{}/api/exams/{}/attempt/answer", address, exam_id))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "question_id": 1, "option_id": "a" }))
        .send()
        .await
        .unwrap();

    // Starting again resumes the same session, keeping the answers.
    let resumed: serde_json::Value = client
        .post(format!("{}/api/exams/{}/attempt", address, exam_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resumed["answered_count"], 1);
}

#[tokio::test]
async fn missing_result_is_a_404() {
    let (address, _store) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = student_token(&client, &address).await;

    let response = client
        .get(format!("{}/api/results/123", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}
