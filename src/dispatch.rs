use std::{ops::Deref, sync::Arc};

use chrono::Utc;

use crate::{
    session::{SessionState, Sessions, UserId},
    weather::{self, Coordinates, Lookup},
};

pub const SEND_LOCATION: &str = "📍 Отправить локацию";
pub const ENTER_CITY: &str = "✏️ Ввести город";

pub const CITY_PROMPT: &str = "Введите название города, чтобы узнать погоду:";
pub const NOT_UNDERSTOOD: &str =
    "Я не понимаю это сообщение. Используйте кнопки для взаимодействия.";
pub const HELP: &str = "Отправь свою локацию кнопкой «📍 Отправить локацию» \
    или нажми «✏️ Ввести город» и напиши название города, \
    и я расскажу тебе о погоде.";

/// The menu button sends the phrase verbatim, but it is also accepted
/// inside a longer message.
fn is_city_trigger(text: &str) -> bool {
    text.contains(ENTER_CITY)
}

/// Something a user did, stripped of transport details.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Start { first_name: String },
    Help,
    Text(String),
    Location(Coordinates),
    Unrecognized,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
    pub label: &'static str,
    pub requests_location: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    fn main_menu() -> Self {
        Self {
            rows: vec![
                vec![Button {
                    label: SEND_LOCATION,
                    requests_location: true,
                }],
                vec![Button {
                    label: ENTER_CITY,
                    requests_location: false,
                }],
            ],
        }
    }

    pub fn requests_location(&self) -> bool {
        self.rows
            .iter()
            .flatten()
            .any(|button| button.requests_location)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    fn with_menu(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(Keyboard::main_menu()),
        }
    }
}

pub struct DispatcherInner {
    sessions: Sessions,
    weather: weather::Client,
}

impl DispatcherInner {
    pub fn sessions(&self) -> &Sessions {
        &self.sessions
    }

    pub fn session_state(&self, user: UserId) -> SessionState {
        self.sessions.state(user)
    }

    /// Routes one event to its handler. Always yields exactly one reply.
    pub async fn handle(&self, user: UserId, event: Event) -> Reply {
        match event {
            Event::Start { first_name } => Self::start(&first_name),
            Event::Help => Reply::with_menu(HELP),
            Event::Text(text) if is_city_trigger(&text) => self.request_city(user),
            Event::Text(text) => self.city_text(user, text).await,
            Event::Location(coords) => self.location(coords).await,
            Event::Unrecognized => Reply::text(NOT_UNDERSTOOD),
        }
    }

    fn start(first_name: &str) -> Reply {
        Reply::with_menu(format!(
            "Привет, {first_name}! Отправь свою локацию или введи свой город, \
             и я расскажу тебе о погоде."
        ))
    }

    fn request_city(&self, user: UserId) -> Reply {
        self.sessions.await_city(user, Utc::now());
        log::debug!("user {user} is about to type a city");

        Reply::text(CITY_PROMPT)
    }

    async fn city_text(&self, user: UserId, text: String) -> Reply {
        let Some(asked) = self.sessions.take_pending_city(user) else {
            return Reply::text(NOT_UNDERSTOOD);
        };
        log::debug!(
            "user {user} typed a city {}s after asking",
            (Utc::now() - asked).num_seconds()
        );

        let lookup = Lookup::City(text.trim().to_string());

        Reply::text(self.weather.report(&lookup).await)
    }

    async fn location(&self, coords: Coordinates) -> Reply {
        Reply::text(self.weather.report(&Lookup::Coordinates(coords)).await)
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Dispatcher {
    pub fn new(weather: weather::Client) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                sessions: Sessions::new(),
                weather,
            }),
        }
    }
}

impl Deref for Dispatcher {
    type Target = DispatcherInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
