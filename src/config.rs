use std::{path::Path, time::Duration};

use config::{Config, ConfigError, Environment};

const ENV_PREFIX: &str = "WEATHERBOT";
const ENV_SEPARATOR: &str = "__";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to read config")]
    ReadedError(#[source] ConfigError),
    #[error("failed to parse config")]
    ParserError(#[source] ConfigError),
    #[error("telegram_token must not be empty")]
    MissingTelegramToken,
    #[error("api_key must not be empty")]
    MissingApiKey,
    #[error("lang must not be empty")]
    MissingLang,
    #[error("timeout_secs must be greater than zero")]
    InvalidTimeout,
    #[error("sweep_interval_minutes must be greater than zero")]
    InvalidSweepInterval,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Bot {
    pub telegram_token: String,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_lang() -> String {
    "ru".to_string()
}

fn default_timeout_secs() -> u16 {
    10
}

fn default_sweep_interval_minutes() -> u16 {
    30
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Weather {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u16,
}

impl Weather {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs as u64)
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Session {
    #[serde(default = "default_sweep_interval_minutes")]
    pub sweep_interval_minutes: u16,
}

impl Session {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes as u64 * 60)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            sweep_interval_minutes: default_sweep_interval_minutes(),
        }
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct App {
    pub bot: Bot,
    pub weather: Weather,
    #[serde(default)]
    pub session: Session,
}

impl App {
    /// Reads the config file, letting `WEATHERBOT__<SECTION>__<KEY>`
    /// variables override any of its values.
    pub fn parse(path: &Path) -> Result<Self, Error> {
        let file = config::File::from(path);
        let env = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR);

        let config = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()
            .map_err(Error::ReadedError)?
            .try_deserialize::<App>()
            .map_err(Error::ParserError)?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.bot.telegram_token.trim().is_empty() {
            return Err(Error::MissingTelegramToken);
        }

        if self.weather.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey);
        }

        if self.weather.lang.trim().is_empty() {
            return Err(Error::MissingLang);
        }

        if self.weather.timeout_secs == 0 {
            return Err(Error::InvalidTimeout);
        }

        if self.session.sweep_interval_minutes == 0 {
            return Err(Error::InvalidSweepInterval);
        }

        Ok(())
    }
}
