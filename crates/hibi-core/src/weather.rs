//! Weather helpers: WMO code lookup, forecast payload parsing, umbrella
//! alerts and forecast cache expiry.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherInfo {
    pub icon: &'static str,
    /// Translation key of the label
    pub label: &'static str,
}

pub const UNKNOWN_WEATHER: WeatherInfo = WeatherInfo {
    icon: "❓",
    label: "weather.unknown",
};

const WEATHER_CODES: &[(i64, WeatherInfo)] = &[
    (0, WeatherInfo { icon: "☀️", label: "weather.clear" }),
    (1, WeatherInfo { icon: "🌤️", label: "weather.clear_thin" }),
    (2, WeatherInfo { icon: "⛅", label: "weather.partly_cloudy" }),
    (3, WeatherInfo { icon: "☁️", label: "weather.cloudy" }),
    (45, WeatherInfo { icon: "🌫️", label: "weather.fog" }),
    (48, WeatherInfo { icon: "🌫️❄️", label: "weather.rime_fog" }),
    (51, WeatherInfo { icon: "🌧️", label: "weather.drizzle_light" }),
    (53, WeatherInfo { icon: "🌧️", label: "weather.drizzle_moderate" }),
    (55, WeatherInfo { icon: "🌧️", label: "weather.drizzle_heavy" }),
    (56, WeatherInfo { icon: "🌧️❄️", label: "weather.freezing_drizzle_light" }),
    (57, WeatherInfo { icon: "🌧️❄️", label: "weather.freezing_drizzle_heavy" }),
    (61, WeatherInfo { icon: "🌦️", label: "weather.rain_light" }),
    (63, WeatherInfo { icon: "🌧️", label: "weather.rain_moderate" }),
    (65, WeatherInfo { icon: "🌧️🌧️", label: "weather.rain_heavy" }),
    (66, WeatherInfo { icon: "🌧️❄️", label: "weather.freezing_rain_light" }),
    (67, WeatherInfo { icon: "🌧️❄️", label: "weather.freezing_rain_heavy" }),
    (71, WeatherInfo { icon: "🌨️", label: "weather.snow_light" }),
    (73, WeatherInfo { icon: "🌨️", label: "weather.snow_moderate" }),
    (75, WeatherInfo { icon: "❄️❄️", label: "weather.snow_heavy" }),
    (77, WeatherInfo { icon: "❄️", label: "weather.snow_grains" }),
    (80, WeatherInfo { icon: "🌦️", label: "weather.showers_light" }),
    (81, WeatherInfo { icon: "🌧️", label: "weather.showers_moderate" }),
    (82, WeatherInfo { icon: "🌧️🌧️", label: "weather.showers_violent" }),
    (85, WeatherInfo { icon: "🌨️", label: "weather.snow_showers_light" }),
    (86, WeatherInfo { icon: "🌨️🌨️", label: "weather.snow_showers_heavy" }),
    (95, WeatherInfo { icon: "⛈️", label: "weather.thunderstorm" }),
    (96, WeatherInfo { icon: "⛈️❄️", label: "weather.thunderstorm_hail_light" }),
    (99, WeatherInfo { icon: "⛈️❄️❄️", label: "weather.thunderstorm_hail_heavy" }),
];

/// Codes that warrant an umbrella (or boots).
const PRECIPITATION_CODES: &[i64] = &[
    48, 51, 53, 55, 56, 57, 61, 63, 65, 66, 67, 71, 73, 75, 77, 80, 81, 82, 85, 86, 95, 96, 99,
];

const OUTDOOR_KEYWORDS: &[&str] = &[
    "go", "ride", "visit", "travel", "walk", "hike", "walking", "hiking", "run", "jog", "jogging",
    "drive", "trip", "meet", "date",
    "пойти", "поехать", "посетить", "поездка", "поездку", "прогулка", "прогулку", "поход",
    "гулять", "погулять", "выйти", "сходить", "пробежка", "пробежку", "пробежать", "пробегать",
    "встретиться", "встреча", "встречу", "свидание",
    "会う", "訪ねる", "出かける", "お出かけ", "お出掛け", "行く", "歩く", "走る", "屋外",
    "ランニング", "旅行", "デート", "旅", "訪問", "遊び", "散歩", "お散歩", "登る", "外出",
    "メトロ", "バス", "地下鉄", "出社", "お参り",
];

/// Icon and label for a WMO weather code. Unknown codes map to
/// [`UNKNOWN_WEATHER`].
pub fn describe_weather_code(code: i64) -> WeatherInfo {
    WEATHER_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, info)| *info)
        .unwrap_or(UNKNOWN_WEATHER)
}

pub fn is_precipitation(code: i64) -> bool {
    PRECIPITATION_CODES.contains(&code)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub max: f64,
    pub min: f64,
    pub code: i64,
}

impl DailyForecast {
    pub fn info(&self) -> WeatherInfo {
        describe_weather_code(self.code)
    }
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    daily: OpenMeteoDaily,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoDaily {
    time: Vec<NaiveDate>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    #[serde(alias = "weather_code")]
    weathercode: Vec<i64>,
}

/// Parses the `daily` block of an Open-Meteo forecast response.
pub fn parse_forecast(json: &str) -> Result<Vec<DailyForecast>, CoreError> {
    let response: OpenMeteoResponse = serde_json::from_str(json)?;
    let daily = response.daily;
    let days = daily.time.len();
    if daily.temperature_2m_max.len() != days
        || daily.temperature_2m_min.len() != days
        || daily.weathercode.len() != days
    {
        return Err(CoreError::InvalidInput(
            "Forecast arrays have different lengths".to_string(),
        ));
    }

    Ok(daily
        .time
        .into_iter()
        .zip(daily.temperature_2m_max)
        .zip(daily.temperature_2m_min)
        .zip(daily.weathercode)
        .map(|(((date, max), min), code)| DailyForecast { date, max, min, code })
        .collect())
}

fn mentions_outdoors(text: &str) -> bool {
    let text = text.to_lowercase();
    OUTDOOR_KEYWORDS.iter().any(|kw| text.contains(kw))
}

/// True when today's weather is wet and some task sounds like it happens
/// outside.
pub fn should_show_umbrella_alert(tasks: &[Task], today: Option<&DailyForecast>) -> bool {
    let Some(today) = today else {
        return false;
    };
    is_precipitation(today.code)
        && tasks.iter().any(|t| {
            mentions_outdoors(&t.title) || t.description.as_deref().is_some_and(mentions_outdoors)
        })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedForecast {
    pub fetched_at: DateTime<Utc>,
    pub days: Vec<DailyForecast>,
}

/// Forecasts keyed by city name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastCache {
    entries: BTreeMap<String, CachedForecast>,
}

impl ForecastCache {
    pub fn insert(&mut self, city: impl Into<String>, days: Vec<DailyForecast>, fetched_at: DateTime<Utc>) {
        self.entries.insert(city.into(), CachedForecast { fetched_at, days });
    }

    /// The cached forecast for `city` if it is younger than `ttl`.
    pub fn get_fresh(&self, city: &str, now: DateTime<Utc>, ttl: Duration) -> Option<&[DailyForecast]> {
        self.entries
            .get(city)
            .filter(|entry| now <= entry.fetched_at + ttl)
            .map(|entry| entry.days.as_slice())
    }

    /// Drops entries older than `ttl`; returns how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now <= entry.fetched_at + ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
