use std::fmt;

const MILD_FROM: f64 = 0.0;
const HOT_FROM: f64 = 15.0;

/// Temperature bucket driving the commentary line of a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Band {
    Cold,
    Mild,
    Hot,
}

impl Band {
    pub fn classify(celsius: f64) -> Self {
        if celsius <= MILD_FROM {
            Self::Cold
        } else if celsius < HOT_FROM {
            Self::Mild
        } else {
            Self::Hot
        }
    }

    pub fn commentary(&self) -> &'static str {
        match self {
            Self::Cold => "❄️ Холодно, одевайся теплее!",
            Self::Mild => "☀️ Прохладно, но приятно!",
            Self::Hot => "🔥 Жарко, выходи на прогулку!",
        }
    }
}

/// Current weather at one place, ready to be sent back to the user.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub city: String,
    /// Celsius, as reported by the provider.
    pub temperature: f64,
    pub description: String,
}

impl Report {
    pub fn band(&self) -> Band {
        Band::classify(self.temperature)
    }

    /// Whole degrees shown to the user.
    pub fn displayed_temperature(&self) -> i64 {
        self.temperature.round() as i64
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📍 Город: {}", self.city)?;
        writeln!(f, "🌡 Температура: {}°C", self.displayed_temperature())?;
        writeln!(f, "{}", self.band().commentary())?;
        write!(f, "🌥 {}", capitalize(&self.description))
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();

    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
