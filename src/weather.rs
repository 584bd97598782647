use std::fmt;

use serde::Deserialize;

use crate::{config, report::Report};

pub const CONNECTION_FAILURE: &str = "Ошибка соединения с сервером погоды.";
pub const DATA_UNAVAILABLE: &str = "Не удалось получить данные о погоде. Попробуйте позже.";
pub const CITY_NOT_FOUND: &str = "Не удалось найти город. Проверьте правильность написания.";

const UNKNOWN_PLACE: &str = "Неизвестное место";
const UNITS: &str = "metric";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to build http client")]
    Creation(#[source] reqwest::Error),
    #[error("failed to reach weather provider")]
    Connection(#[source] reqwest::Error),
    #[error("weather provider answered with status {status}: {payload}")]
    Rejected { status: u16, payload: String },
    #[error("weather provider sent an unreadable body")]
    Malformed(#[source] serde_json::Error),
    #[error("weather provider sent no weather description")]
    Incomplete,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// What the provider is asked about.
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup {
    Coordinates(Coordinates),
    City(String),
}

impl Lookup {
    fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Coordinates(coords) => vec![
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
            ],
            Self::City(city) => vec![("q", city.clone())],
        }
    }

    fn fallback_place(&self) -> &str {
        match self {
            Self::Coordinates(_) => UNKNOWN_PLACE,
            Self::City(city) => city,
        }
    }

    /// User facing text for a failed lookup.
    pub fn failure_message(&self, err: &Error) -> &'static str {
        match (self, err) {
            (_, Error::Creation(_) | Error::Connection(_)) => CONNECTION_FAILURE,
            (Self::City(_), Error::Rejected { .. }) => CITY_NOT_FOUND,
            _ => DATA_UNAVAILABLE,
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coordinates(coords) => write!(f, "({}, {})", coords.latitude, coords.longitude),
            Self::City(city) => write!(f, "'{city}'"),
        }
    }
}

#[derive(Deserialize, Debug)]
struct Main {
    temp: f64,
}

#[derive(Deserialize, Debug)]
struct Condition {
    description: String,
}

#[derive(Deserialize, Debug)]
struct CurrentWeather {
    #[serde(default)]
    name: Option<String>,
    main: Main,
    #[serde(default)]
    weather: Vec<Condition>,
}

impl CurrentWeather {
    fn into_report(self, lookup: &Lookup) -> Result<Report, Error> {
        let description = self
            .weather
            .into_iter()
            .next()
            .map(|condition| condition.description)
            .ok_or(Error::Incomplete)?;

        let city = self
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| lookup.fallback_place().to_string());

        Ok(Report {
            city,
            temperature: self.main.temp,
            description,
        })
    }
}

/// Client of the OpenWeather current weather endpoint.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    lang: String,
}

impl Client {
    pub fn new(conf: &config::Weather) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(conf.timeout())
            .build()
            .map_err(Error::Creation)?;

        Ok(Self {
            http,
            endpoint: format!("{}/weather", conf.base_url.trim_end_matches('/')),
            api_key: conf.api_key.clone(),
            lang: conf.lang.clone(),
        })
    }

    pub async fn current(&self, lookup: &Lookup) -> Result<Report, Error> {
        log::debug!("requesting current weather for {lookup}");

        let response = self
            .http
            .get(&self.endpoint)
            .query(&lookup.query())
            .query(&[
                ("appid", self.api_key.as_str()),
                ("units", UNITS),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .map_err(Error::Connection)?;

        let status = response.status();
        let payload = response.text().await.map_err(Error::Connection)?;

        if !status.is_success() {
            return Err(Error::Rejected {
                status: status.as_u16(),
                payload,
            });
        }

        serde_json::from_str::<CurrentWeather>(&payload)
            .map_err(Error::Malformed)?
            .into_report(lookup)
    }

    /// Looks up the weather and renders it, turning any failure into a
    /// message for the user.
    pub async fn report(&self, lookup: &Lookup) -> String {
        match self.current(lookup).await {
            Ok(report) => report.to_string(),
            Err(err) => {
                log::error!("weather lookup for {lookup} failed: {err}");

                lookup.failure_message(&err).to_string()
            }
        }
    }
}
