//! Dispatcher scenarios with the weather provider stubbed by wiremock.

use weatherbot::{
    config,
    dispatch::{Dispatcher, Event, CITY_PROMPT, ENTER_CITY, HELP, NOT_UNDERSTOOD},
    report::Band,
    session::SessionState,
    weather::{self, Coordinates, CITY_NOT_FOUND},
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER: u64 = 1001;

fn dispatcher(base_url: &str) -> Dispatcher {
    let conf = config::Weather {
        api_key: "test-key".to_string(),
        base_url: base_url.to_string(),
        lang: "ru".to_string(),
        timeout_secs: 2,
    };

    Dispatcher::new(weather::Client::new(&conf).unwrap())
}

fn current_weather(name: &str, temp: f64, description: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "main": { "temp": temp },
        "weather": [{ "description": description }]
    })
}

#[tokio::test]
async fn test_start_greets_by_first_name() {
    let mock_server = MockServer::start().await;
    let dispatcher = dispatcher(&mock_server.uri());

    let reply = dispatcher
        .handle(
            USER,
            Event::Start {
                first_name: "Анна".to_string(),
            },
        )
        .await;

    assert!(reply.text.contains("Анна"));
    let keyboard = reply.keyboard.expect("start reply carries a keyboard");
    assert!(keyboard.requests_location());
    assert!(keyboard
        .rows
        .iter()
        .flatten()
        .any(|button| button.label == ENTER_CITY));
}

#[tokio::test]
async fn test_help_shows_menu() {
    let mock_server = MockServer::start().await;
    let dispatcher = dispatcher(&mock_server.uri());

    let reply = dispatcher.handle(USER, Event::Help).await;

    assert_eq!(reply.text, HELP);
    assert!(reply.keyboard.is_some());
}

#[tokio::test]
async fn test_text_without_trigger_is_not_understood() {
    let mock_server = MockServer::start().await;
    let dispatcher = dispatcher(&mock_server.uri());

    let reply = dispatcher
        .handle(USER, Event::Text("Paris".to_string()))
        .await;

    assert_eq!(reply.text, NOT_UNDERSTOOD);
    assert!(reply.keyboard.is_none());
    assert_eq!(dispatcher.session_state(USER), SessionState::Idle);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_enter_city_then_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Paris"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(current_weather("Paris", 20.0, "clear sky")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher(&mock_server.uri());

    let prompt = dispatcher
        .handle(USER, Event::Text(ENTER_CITY.to_string()))
        .await;
    assert_eq!(prompt.text, CITY_PROMPT);
    assert!(matches!(
        dispatcher.session_state(USER),
        SessionState::AwaitingCity { .. }
    ));

    let reply = dispatcher
        .handle(USER, Event::Text("  Paris ".to_string()))
        .await;

    assert!(reply.text.contains("Paris"));
    assert!(reply.text.contains(Band::Hot.commentary()));
    assert!(reply.text.contains("Clear sky"));
    assert_eq!(dispatcher.session_state(USER), SessionState::Idle);

    let again = dispatcher
        .handle(USER, Event::Text("Paris".to_string()))
        .await;
    assert_eq!(again.text, NOT_UNDERSTOOD);
}

#[tokio::test]
async fn test_unknown_city_clears_pending_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher(&mock_server.uri());

    dispatcher
        .handle(USER, Event::Text(ENTER_CITY.to_string()))
        .await;
    let reply = dispatcher
        .handle(USER, Event::Text("Atlantis".to_string()))
        .await;

    assert_eq!(reply.text, CITY_NOT_FOUND);
    assert_eq!(dispatcher.session_state(USER), SessionState::Idle);
}

#[tokio::test]
async fn test_location_reports_weather() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "59.94"))
        .and(query_param("lon", "30.31"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_weather("Санкт-Петербург", 9.0, "облачно")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher(&mock_server.uri());

    dispatcher
        .handle(USER, Event::Text(ENTER_CITY.to_string()))
        .await;
    let reply = dispatcher
        .handle(
            USER,
            Event::Location(Coordinates {
                latitude: 59.94,
                longitude: 30.31,
            }),
        )
        .await;

    assert!(reply.text.contains("Санкт-Петербург"));
    assert!(reply.text.contains(Band::Mild.commentary()));
    assert!(reply.text.contains("Облачно"));
    assert!(matches!(
        dispatcher.session_state(USER),
        SessionState::AwaitingCity { .. }
    ));
}

#[tokio::test]
async fn test_location_keeps_pending_city_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "48.85"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(current_weather("Paris", 12.0, "дымка")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Paris"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(current_weather("Paris", 20.0, "clear sky")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher(&mock_server.uri());

    dispatcher
        .handle(USER, Event::Text(ENTER_CITY.to_string()))
        .await;
    dispatcher
        .handle(
            USER,
            Event::Location(Coordinates {
                latitude: 48.85,
                longitude: 2.35,
            }),
        )
        .await;
    let reply = dispatcher
        .handle(USER, Event::Text("Paris".to_string()))
        .await;

    assert!(reply.text.contains("Paris"));
    assert!(reply.text.contains(Band::Hot.commentary()));
    assert_eq!(dispatcher.session_state(USER), SessionState::Idle);
}

#[tokio::test]
async fn test_start_keeps_pending_city_request() {
    let mock_server = MockServer::start().await;
    let dispatcher = dispatcher(&mock_server.uri());

    dispatcher
        .handle(USER, Event::Text(ENTER_CITY.to_string()))
        .await;
    let reply = dispatcher
        .handle(
            USER,
            Event::Start {
                first_name: "Анна".to_string(),
            },
        )
        .await;

    assert!(reply.text.contains("Анна"));
    assert!(matches!(
        dispatcher.session_state(USER),
        SessionState::AwaitingCity { .. }
    ));
}

#[tokio::test]
async fn test_trigger_inside_longer_text() {
    let mock_server = MockServer::start().await;
    let dispatcher = dispatcher(&mock_server.uri());

    let reply = dispatcher
        .handle(USER, Event::Text(format!(" {ENTER_CITY} ")))
        .await;

    assert_eq!(reply.text, CITY_PROMPT);
    assert!(matches!(
        dispatcher.session_state(USER),
        SessionState::AwaitingCity { .. }
    ));
}

#[tokio::test]
async fn test_unrecognized_keeps_pending_request() {
    let mock_server = MockServer::start().await;
    let dispatcher = dispatcher(&mock_server.uri());

    dispatcher
        .handle(USER, Event::Text(ENTER_CITY.to_string()))
        .await;
    let reply = dispatcher.handle(USER, Event::Unrecognized).await;

    assert_eq!(reply.text, NOT_UNDERSTOOD);
    assert!(matches!(
        dispatcher.session_state(USER),
        SessionState::AwaitingCity { .. }
    ));
}

#[tokio::test]
async fn test_users_have_separate_sessions() {
    let mock_server = MockServer::start().await;
    let dispatcher = dispatcher(&mock_server.uri());

    dispatcher
        .handle(USER, Event::Text(ENTER_CITY.to_string()))
        .await;
    let reply = dispatcher
        .handle(USER + 1, Event::Text("Paris".to_string()))
        .await;

    assert_eq!(reply.text, NOT_UNDERSTOOD);
    assert_eq!(dispatcher.session_state(USER + 1), SessionState::Idle);
    assert!(matches!(
        dispatcher.session_state(USER),
        SessionState::AwaitingCity { .. }
    ));
}
