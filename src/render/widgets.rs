use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::classifier::{Choice, RenderOptions};
use crate::conversation::WidgetPayload;
use crate::util::capitalize_words;

const WEATHER_ICON_BASE_URL: &str = "http://openweathermap.org/img/wn";

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("invalid {widget_type} payload: {source}")]
    InvalidPayload {
        widget_type: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("weather data is missing {0}")]
    MalformedWeather(&'static str),
}

/// Projects one widget payload into something the UI can draw.
pub trait WidgetRenderer: Send + Sync {
    fn render(&self, payload: &WidgetPayload, options: &RenderOptions) -> WidgetView;
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetView {
    List(ListView),
    Map(MapView),
    Weather(WeatherView),
    Unknown {
        widget_type: String,
        problem: Option<String>,
    },
}

impl WidgetView {
    pub fn unknown(widget_type: impl Into<String>) -> Self {
        WidgetView::Unknown {
            widget_type: widget_type.into(),
            problem: None,
        }
    }

    pub fn choices(&self) -> Vec<Choice> {
        match self {
            WidgetView::List(list) => list.choices(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub title: String,
    pub items: Vec<String>,
    pub interactive: bool,
}

impl ListView {
    /// Each item echoes its own text when activated. Static lists have none.
    pub fn choices(&self) -> Vec<Choice> {
        if !self.interactive {
            return Vec::new();
        }
        self.items.iter().map(Choice::echo).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapView {
    pub location: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherView {
    Fetching { location: String },
    Ready(WeatherReport),
    Unavailable { location: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherReport {
    pub city: String,
    pub temperature: i64,
    pub feels_like: Option<i64>,
    pub description: String,
    pub icon_url: Option<String>,
}

impl WeatherReport {
    pub fn temperature_label(&self) -> String {
        format!("{}°C", self.temperature)
    }

    pub fn feels_like_label(&self) -> Option<String> {
        self.feels_like.map(|t| format!("Feels like: {}°C", t))
    }
}

#[derive(Debug, Deserialize)]
struct ListPayload {
    #[serde(default)]
    title: String,
    items: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MapPayload {
    location: String,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WeatherPayload {
    location: String,
    #[serde(default)]
    api_data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawWeatherPayload {
    #[serde(default)]
    name: Option<String>,
    main: RawWeatherMain,
    #[serde(default)]
    weather: Vec<RawWeatherCondition>,
}

#[derive(Debug, Deserialize)]
struct RawWeatherMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawWeatherCondition {
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: Option<String>,
}

fn decode<T: DeserializeOwned>(payload: &WidgetPayload) -> Result<T, WidgetError> {
    serde_json::from_value(payload.body()).map_err(|source| WidgetError::InvalidPayload {
        widget_type: payload.widget_type.clone(),
        source,
    })
}

fn invalid(payload: &WidgetPayload, err: WidgetError) -> WidgetView {
    tracing::warn!("Widget '{}' could not be decoded: {}", payload.widget_type, err);
    WidgetView::Unknown {
        widget_type: payload.widget_type.clone(),
        problem: Some(err.to_string()),
    }
}

pub struct ListRenderer;

impl WidgetRenderer for ListRenderer {
    fn render(&self, payload: &WidgetPayload, options: &RenderOptions) -> WidgetView {
        match decode::<ListPayload>(payload) {
            Ok(list) => WidgetView::List(ListView {
                title: list.title,
                items: list.items,
                interactive: options.interactive_lists,
            }),
            Err(err) => invalid(payload, err),
        }
    }
}

pub struct MapRenderer;

impl WidgetRenderer for MapRenderer {
    fn render(&self, payload: &WidgetPayload, _options: &RenderOptions) -> WidgetView {
        match decode::<MapPayload>(payload) {
            Ok(map) => WidgetView::Map(MapView {
                location: map.location,
                details: map.details.filter(|d| !d.is_empty()),
            }),
            Err(err) => invalid(payload, err),
        }
    }
}

pub struct WeatherRenderer;

impl WidgetRenderer for WeatherRenderer {
    fn render(&self, payload: &WidgetPayload, _options: &RenderOptions) -> WidgetView {
        let weather = match decode::<WeatherPayload>(payload) {
            Ok(weather) => weather,
            Err(err) => return invalid(payload, err),
        };

        let view = match weather.api_data {
            None | Some(Value::Null) => WeatherView::Fetching {
                location: weather.location,
            },
            Some(data) => match project_weather(data, &weather.location) {
                Ok(report) => WeatherView::Ready(report),
                Err(err) => {
                    tracing::warn!("Weather data for '{}' unusable: {}", weather.location, err);
                    WeatherView::Unavailable {
                        location: weather.location,
                    }
                }
            },
        };
        WidgetView::Weather(view)
    }
}

fn project_weather(data: Value, location: &str) -> Result<WeatherReport, WidgetError> {
    let raw: RawWeatherPayload =
        serde_json::from_value(data).map_err(|source| WidgetError::InvalidPayload {
            widget_type: "weather".to_string(),
            source,
        })?;
    let condition = raw
        .weather
        .into_iter()
        .next()
        .ok_or(WidgetError::MalformedWeather("weather[0]"))?;

    Ok(WeatherReport {
        city: raw
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| location.to_string()),
        temperature: round_degrees(raw.main.temp),
        feels_like: raw.main.feels_like.map(round_degrees),
        description: capitalize_words(&condition.description),
        icon_url: condition
            .icon
            .filter(|icon| !icon.is_empty())
            .map(|icon| format!("{}/{}@2x.png", WEATHER_ICON_BASE_URL, icon)),
    })
}

/// Rounds half away from zero.
fn round_degrees(value: f64) -> i64 {
    value.round() as i64
}
