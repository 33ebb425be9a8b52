//! End-to-end session scenarios against an in-memory store, a mock image
//! host and a recording transport.

use std::sync::Arc;
use std::time::Duration;

use trophy_bot::session::{
    CORRECT_ANSWER_TEXT, HELP_TEXT, IMAGE_FAILURE_TEXT, STORE_FAILURE_TEXT, WELCOME_TEXT,
};
use trophy_bot::test_util::{
    click, private_event, FailingTransport, RecordingTransport, Sent, UnavailableStore,
};
use trophy_bot::{
    EventKind, ImageClient, QuizBank, RewardCatalog, SessionHandler, SqliteUserStore,
    TransportError, UserStore,
};
use trophy_common::{ButtonAction, QuizQuestion, RewardItem};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];

struct Harness {
    handler: SessionHandler,
    store: Arc<SqliteUserStore>,
    transport: Arc<RecordingTransport>,
    _image_host: MockServer,
}

/// Build a handler whose single reward lives at `image_path` on a mock host.
/// `/cup.png` answers with image bytes, anything else with 404.
async fn harness(image_path: &str) -> Harness {
    let image_host = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cup.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG.to_vec()))
        .mount(&image_host)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&image_host)
        .await;

    let rewards = RewardCatalog::new(vec![RewardItem::new(
        "Champions Cup",
        "Legendary",
        &format!("{}{}", image_host.uri(), image_path),
    )])
    .unwrap();
    let quiz = QuizBank::new(vec![QuizQuestion::new(
        "What rarity is the Victory Trophy?",
        "Rare",
        &["Legendary", "Rare", "Common"],
    )])
    .unwrap();

    let store = Arc::new(SqliteUserStore::in_memory().unwrap());
    let transport = Arc::new(RecordingTransport::new());
    let handler = SessionHandler::new(
        store.clone(),
        rewards,
        quiz,
        ImageClient::new(Duration::from_secs(5)).unwrap(),
        transport.clone(),
    );

    Harness {
        handler,
        store,
        transport,
        _image_host: image_host,
    }
}

#[tokio::test]
async fn test_start_sends_menu_with_four_buttons() {
    let h = harness("/cup.png").await;

    h.handler
        .handle(private_event(1, "Alice", EventKind::Start))
        .await
        .unwrap();

    match h.transport.last() {
        Some(Sent::Menu { chat_id, text, buttons }) => {
            assert_eq!(chat_id, 1);
            assert_eq!(text, WELCOME_TEXT);
            assert_eq!(buttons.len(), 4);
            assert_eq!(buttons[0].payload, "get_image");
        }
        other => panic!("expected menu, got {:?}", other),
    }
}

#[tokio::test]
async fn test_help_replies_with_usage() {
    let h = harness("/cup.png").await;

    h.handler
        .handle(private_event(1, "Alice", EventKind::Help))
        .await
        .unwrap();

    assert_eq!(
        h.transport.last(),
        Some(Sent::Text { chat_id: 1, text: HELP_TEXT.to_string() })
    );
}

#[tokio::test]
async fn test_first_event_materializes_user() {
    let h = harness("/cup.png").await;
    assert!(h.store.get(5).unwrap().is_none());

    h.handler
        .handle(private_event(5, "Eve", EventKind::Start))
        .await
        .unwrap();

    let record = h.store.get(5).unwrap().unwrap();
    assert_eq!(record.display_name, "Eve");
    assert_eq!(record.rating, 0);
    assert_eq!(record.quiz_score, 0);
}

#[tokio::test]
async fn test_new_user_menu_then_draw_reward() {
    let h = harness("/cup.png").await;

    h.handler
        .handle(private_event(1, "Alice", EventKind::Start))
        .await
        .unwrap();
    h.handler.handle(click(1, "Alice", "get_image")).await.unwrap();

    assert_eq!(
        h.transport.last(),
        Some(Sent::Photo {
            chat_id: 1,
            image: PNG.to_vec(),
            caption: "Name: Champions Cup\nRarity: Legendary".to_string(),
        })
    );

    let record = h.store.get(1).unwrap().unwrap();
    assert_eq!(record.rating, 1);
    assert_eq!(record.quiz_score, 0);
    assert_eq!(h.store.count().unwrap(), 1);
}

#[tokio::test]
async fn test_failed_image_fetch_leaves_rating_unchanged() {
    let h = harness("/missing.png").await;

    h.handler.handle(click(2, "Bob", "get_image")).await.unwrap();
    h.handler.handle(click(2, "Bob", "get_image")).await.unwrap();

    assert_eq!(
        h.transport.last(),
        Some(Sent::Text { chat_id: 2, text: IMAGE_FAILURE_TEXT.to_string() })
    );
    assert_eq!(h.store.get(2).unwrap().unwrap().rating, 0);
}

#[tokio::test]
async fn test_leaderboard_lists_top_five_and_own_score() {
    let h = harness("/cup.png").await;
    for (id, rating) in [(10, 1), (11, 6), (12, 3), (13, 9), (14, 2), (15, 5)] {
        h.store
            .upsert(id, &format!("player-{id}"), trophy_bot::CounterField::Rating, rating)
            .unwrap();
    }

    h.handler.handle(click(10, "player-10", "rating")).await.unwrap();

    let expected = "Leaderboard (top 5):\n\
                    1. player-13: 9 points\n\
                    2. player-11: 6 points\n\
                    3. player-15: 5 points\n\
                    4. player-12: 3 points\n\
                    5. player-14: 2 points\n\
                    \n\
                    Your points: 1";
    assert_eq!(
        h.transport.last(),
        Some(Sent::Text { chat_id: 10, text: expected.to_string() })
    );
}

#[tokio::test]
async fn test_quiz_leaderboard_uses_quiz_score() {
    let h = harness("/cup.png").await;
    h.store
        .upsert(20, "quizzer", trophy_bot::CounterField::QuizScore, 4)
        .unwrap();

    h.handler.handle(click(21, "newbie", "quiz_rating")).await.unwrap();

    match h.transport.last() {
        Some(Sent::Text { text, .. }) => {
            assert!(text.starts_with(
                "Quiz leaderboard (top 5):\n1. quizzer: 4 points\n2. newbie: 0 points"
            ));
            assert!(text.ends_with("Your quiz points: 0"));
        }
        other => panic!("expected text, got {:?}", other),
    }
}

#[tokio::test]
async fn test_quiz_buttons_carry_correct_answer() {
    let h = harness("/cup.png").await;

    h.handler.handle(click(3, "Carol", "quiz")).await.unwrap();

    match h.transport.last() {
        Some(Sent::Menu { text, buttons, .. }) => {
            assert_eq!(text, "What rarity is the Victory Trophy?");
            let labels: Vec<&str> = buttons.iter().map(|b| b.label.as_str()).collect();
            assert_eq!(labels, vec!["Legendary", "Rare", "Common"]);
            for button in &buttons {
                assert!(button.payload.ends_with("|Rare"));
                assert_eq!(
                    ButtonAction::parse(&button.payload).unwrap(),
                    ButtonAction::QuizAnswer {
                        selected: button.label.clone(),
                        correct: "Rare".to_string(),
                    }
                );
            }
        }
        other => panic!("expected menu, got {:?}", other),
    }
}

#[tokio::test]
async fn test_correct_answer_scores_one_point() {
    let h = harness("/cup.png").await;

    h.handler
        .handle(click(4, "Dave", "quiz_answer|Rare|Rare"))
        .await
        .unwrap();

    assert_eq!(
        h.transport.last(),
        Some(Sent::Text { chat_id: 4, text: CORRECT_ANSWER_TEXT.to_string() })
    );
    assert_eq!(h.store.get(4).unwrap().unwrap().quiz_score, 1);
}

#[tokio::test]
async fn test_wrong_answer_keeps_score() {
    let h = harness("/cup.png").await;

    h.handler
        .handle(click(4, "Dave", "quiz_answer|Common|Rare"))
        .await
        .unwrap();

    assert_eq!(
        h.transport.last(),
        Some(Sent::Text {
            chat_id: 4,
            text: "❌ Wrong! The correct answer is: Rare.".to_string(),
        })
    );
    assert_eq!(h.store.get(4).unwrap().unwrap().quiz_score, 0);
}

#[tokio::test]
async fn test_malformed_payload_is_ignored() {
    let h = harness("/cup.png").await;

    h.handler
        .handle(click(6, "Frank", "quiz_answer|Rare"))
        .await
        .unwrap();
    h.handler.handle(click(6, "Frank", "unknown")).await.unwrap();

    assert!(h.transport.sent().is_empty());
    assert_eq!(h.store.get(6).unwrap().unwrap().quiz_score, 0);

    // The handler keeps serving afterwards
    h.handler
        .handle(click(6, "Frank", "quiz_answer|Rare|Rare"))
        .await
        .unwrap();
    assert_eq!(h.store.get(6).unwrap().unwrap().quiz_score, 1);
}

#[tokio::test]
async fn test_display_name_is_last_write_wins() {
    let h = harness("/cup.png").await;

    h.handler
        .handle(private_event(7, "Grace", EventKind::Start))
        .await
        .unwrap();
    h.handler
        .handle(private_event(7, "Grace Hopper", EventKind::Help))
        .await
        .unwrap();

    assert_eq!(h.store.get(7).unwrap().unwrap().display_name, "Grace Hopper");
}

#[tokio::test]
async fn test_concurrent_draws_do_not_lose_increments() {
    let h = Arc::new(harness("/cup.png").await);

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let h = h.clone();
            tokio::spawn(async move { h.handler.handle(click(8, "Heidi", "get_image")).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(h.store.get(8).unwrap().unwrap().rating, 8);
}

#[tokio::test]
async fn test_store_failure_reports_generic_error() {
    let transport = Arc::new(RecordingTransport::new());
    let handler = SessionHandler::new(
        Arc::new(UnavailableStore),
        RewardCatalog::new(trophy_common::default_rewards()).unwrap(),
        QuizBank::new(trophy_common::default_questions()).unwrap(),
        ImageClient::new(Duration::from_secs(1)).unwrap(),
        transport.clone(),
    );

    handler.handle(click(9, "Ivan", "get_image")).await.unwrap();
    handler
        .handle(private_event(9, "Ivan", EventKind::Start))
        .await
        .unwrap();

    assert_eq!(
        transport.sent(),
        vec![
            Sent::Text { chat_id: 9, text: STORE_FAILURE_TEXT.to_string() },
            Sent::Text { chat_id: 9, text: STORE_FAILURE_TEXT.to_string() },
        ]
    );
}

#[tokio::test]
async fn test_send_failure_is_returned_and_next_event_succeeds() {
    let store = Arc::new(SqliteUserStore::in_memory().unwrap());
    let transport = Arc::new(FailingTransport::new(1));
    let handler = SessionHandler::new(
        store.clone(),
        RewardCatalog::new(trophy_common::default_rewards()).unwrap(),
        QuizBank::new(trophy_common::default_questions()).unwrap(),
        ImageClient::new(Duration::from_secs(1)).unwrap(),
        transport.clone(),
    );

    let first = handler.handle(private_event(10, "Judy", EventKind::Start)).await;
    assert!(matches!(first, Err(TransportError::SendFailed(_))));
    assert!(transport.sent().is_empty());

    handler
        .handle(click(10, "Judy", "quiz_answer|Rare|Rare"))
        .await
        .unwrap();

    assert_eq!(store.get(10).unwrap().unwrap().quiz_score, 1);
    assert_eq!(
        transport.sent(),
        vec![Sent::Text { chat_id: 10, text: CORRECT_ANSWER_TEXT.to_string() }]
    );
}
