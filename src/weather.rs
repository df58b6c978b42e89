use anyhow::{anyhow, bail, Result};
use log::{debug, info};
use serde::Deserialize;

use crate::astronomy::MoonData;
use crate::weather_icons::WeatherIcon;

/// Capacity of the forecast sequence. Every renderer indexes below this.
pub const MAX_FORECASTS: usize = 12;
/// UTC hours of the forecast entries kept: noon and midnight.
pub const ALLOWED_FORECAST_HOURS: [u8; 2] = [12, 0];

const OWM_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

pub type Forecasts = heapless::Vec<ForecastEntry, MAX_FORECASTS>;

// ── Data types ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentConditions {
    pub location: String,
    pub main: String,
    pub description: String,
    pub icon: WeatherIcon,
    pub temp: f32,
    pub humidity: u8,
    pub pressure_hpa: u16,
    pub wind_speed: f32,
    pub wind_deg: f32,
    pub clouds: u8,
    pub visibility_m: u32,
    pub sunrise: i64,
    pub sunset: i64,
    pub observation_time: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastEntry {
    pub observation_time: i64,
    pub temp: f32,
    pub humidity: u8,
    pub pressure_hpa: u16,
    /// Precipitation over the 3 h slot.
    pub rain: f32,
    pub wind_speed: f32,
    pub wind_deg: f32,
    pub icon: WeatherIcon,
    pub main: String,
}

/// Everything the views read. Only the refresh cycle writes it.
#[derive(Debug, Clone, Default)]
pub struct WeatherSnapshot {
    pub current: Option<CurrentConditions>,
    pub forecasts: Forecasts,
    pub moon: Option<MoonData>,
}

pub trait WeatherClient {
    fn fetch_current(&mut self, api_key: &str, location_id: &str) -> Result<CurrentConditions>;

    /// Up to `max_entries` forecast slots whose UTC hour is in `allowed_hours`.
    fn fetch_forecast(
        &mut self,
        api_key: &str,
        location_id: &str,
        max_entries: usize,
        allowed_hours: &[u8],
    ) -> Result<Forecasts>;
}

/// Blocking HTTP GET returning the body.
pub trait HttpFetch {
    fn get(&mut self, url: &str) -> Result<String>;
}

// ── OWM JSON structures ─────────────────────────────────────────────

#[derive(Deserialize)]
struct OwmCurrentRoot {
    main: Option<OwmMain>,
    weather: Option<Vec<OwmWeather>>,
    wind: Option<OwmWind>,
    clouds: Option<OwmClouds>,
    visibility: Option<u32>,
    name: Option<String>,
    sys: Option<OwmSys>,
    dt: Option<i64>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct OwmMain {
    temp: Option<f32>,
    humidity: Option<u8>,
    pressure: Option<f32>,
}

#[derive(Deserialize)]
struct OwmWeather {
    main: Option<String>,
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Deserialize)]
struct OwmWind {
    speed: Option<f32>,
    deg: Option<f32>,
}

#[derive(Deserialize)]
struct OwmClouds {
    all: Option<u8>,
}

#[derive(Deserialize)]
struct OwmSys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Deserialize)]
struct OwmRain {
    #[serde(rename = "3h")]
    three_hours: Option<f32>,
}

#[derive(Deserialize)]
struct OwmForecastRoot {
    list: Option<Vec<OwmForecastEntry>>,
    message: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct OwmForecastEntry {
    dt: Option<i64>,
    main: Option<OwmMain>,
    weather: Option<Vec<OwmWeather>>,
    wind: Option<OwmWind>,
    rain: Option<OwmRain>,
}

// ── Parsing ─────────────────────────────────────────────────────────

fn first_weather(list: Option<Vec<OwmWeather>>) -> (String, String, WeatherIcon) {
    list.and_then(|arr| arr.into_iter().next())
        .map(|w| {
            let icon = w.icon.as_deref().map(WeatherIcon::from_owm_code).unwrap_or_default();
            (w.main.unwrap_or_default(), w.description.unwrap_or_default(), icon)
        })
        .unwrap_or_default()
}

pub fn parse_current(json: &str) -> Result<CurrentConditions> {
    let root: OwmCurrentRoot = serde_json::from_str(json)?;
    let main = root.main.ok_or_else(|| {
        anyhow!(
            "current conditions missing 'main' ({})",
            root.message.as_deref().unwrap_or("no message")
        )
    })?;
    let (main_text, description, icon) = first_weather(root.weather);
    let wind = root.wind.unwrap_or(OwmWind { speed: None, deg: None });
    let sys = root.sys.unwrap_or(OwmSys { sunrise: None, sunset: None });

    let current = CurrentConditions {
        location: root.name.unwrap_or_default(),
        main: main_text,
        description,
        icon,
        temp: main.temp.unwrap_or(0.0),
        humidity: main.humidity.unwrap_or(0),
        pressure_hpa: main.pressure.unwrap_or(0.0).round() as u16,
        wind_speed: wind.speed.unwrap_or(0.0),
        wind_deg: wind.deg.unwrap_or(0.0),
        clouds: root.clouds.and_then(|c| c.all).unwrap_or(0),
        visibility_m: root.visibility.unwrap_or(0),
        sunrise: sys.sunrise.unwrap_or(0),
        sunset: sys.sunset.unwrap_or(0),
        observation_time: root.dt.unwrap_or(0),
    };
    info!(
        "weather: {} {:.1} {} icon={:?}",
        current.location, current.temp, current.description, current.icon
    );
    Ok(current)
}

/// UTC hour of day of an epoch timestamp.
pub fn utc_hour(epoch_secs: i64) -> u8 {
    (epoch_secs.rem_euclid(86_400) / 3_600) as u8
}

pub fn parse_forecast(json: &str, max_entries: usize, allowed_hours: &[u8]) -> Result<Forecasts> {
    let root: OwmForecastRoot = serde_json::from_str(json)?;
    let Some(list) = root.list else {
        bail!("forecast missing 'list' ({:?})", root.message);
    };
    let limit = max_entries.min(MAX_FORECASTS);

    let mut out = Forecasts::new();
    for entry in list {
        if out.len() >= limit {
            break;
        }
        let (Some(dt), Some(main)) = (entry.dt, entry.main) else {
            continue;
        };
        if !allowed_hours.contains(&utc_hour(dt)) {
            continue;
        }
        let (main_text, _, icon) = first_weather(entry.weather);
        let wind = entry.wind.unwrap_or(OwmWind { speed: None, deg: None });
        let forecast = ForecastEntry {
            observation_time: dt,
            temp: main.temp.unwrap_or(0.0),
            humidity: main.humidity.unwrap_or(0),
            pressure_hpa: main.pressure.unwrap_or(0.0).round() as u16,
            rain: entry.rain.and_then(|r| r.three_hours).unwrap_or(0.0),
            wind_speed: wind.speed.unwrap_or(0.0),
            wind_deg: wind.deg.unwrap_or(0.0),
            icon,
            main: main_text,
        };
        // Capacity is guarded by `limit` above.
        out.push(forecast).ok();
    }
    debug!("forecast: kept {} entries", out.len());
    Ok(out)
}

// ── Client ──────────────────────────────────────────────────────────

/// OpenWeatherMap client over any blocking HTTP transport.
pub struct OwmClient<H: HttpFetch> {
    http: H,
    metric: bool,
    language: String,
}

impl<H: HttpFetch> OwmClient<H> {
    pub fn new(http: H, metric: bool, language: &str) -> Self {
        Self {
            http,
            metric,
            language: language.to_string(),
        }
    }

    fn url(&self, endpoint: &str, api_key: &str, location_id: &str) -> String {
        let units = if self.metric { "metric" } else { "imperial" };
        format!(
            "{}/{}?id={}&appid={}&units={}&lang={}",
            OWM_BASE_URL, endpoint, location_id, api_key, units, self.language
        )
    }
}

impl<H: HttpFetch> WeatherClient for OwmClient<H> {
    fn fetch_current(&mut self, api_key: &str, location_id: &str) -> Result<CurrentConditions> {
        info!("Fetching current weather for location {}", location_id);
        let url = self.url("weather", api_key, location_id);
        let body = self.http.get(&url)?;
        parse_current(&body)
    }

    fn fetch_forecast(
        &mut self,
        api_key: &str,
        location_id: &str,
        max_entries: usize,
        allowed_hours: &[u8],
    ) -> Result<Forecasts> {
        info!("Fetching forecast for location {}", location_id);
        let url = self.url("forecast", api_key, location_id);
        let body = self.http.get(&url)?;
        parse_forecast(&body, max_entries, allowed_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRENT_JSON: &str = r#"{
        "weather":[{"id":500,"main":"Rain","description":"light rain","icon":"10d"}],
        "main":{"temp":12.4,"pressure":1012,"humidity":81},
        "visibility":10000,
        "wind":{"speed":4.1,"deg":230},
        "clouds":{"all":75},
        "dt":1700000000,
        "sys":{"sunrise":1699942000,"sunset":1699976000},
        "name":"Zurich"
    }"#;

    /// Entries every 6 h starting at 00:00 UTC on 2023-11-15.
    fn forecast_json(count: usize) -> String {
        let base = 1_700_006_400i64;
        let entries: Vec<String> = (0..count)
            .map(|i| {
                format!(
                    r#"{{"dt":{},"main":{{"temp":{}.0,"pressure":1000,"humidity":50}},
                        "weather":[{{"main":"Clouds","icon":"03d"}}],
                        "wind":{{"speed":2.0,"deg":90}},"rain":{{"3h":0.5}}}}"#,
                    base + i as i64 * 6 * 3600,
                    i
                )
            })
            .collect();
        format!(r#"{{"cod":"200","list":[{}]}}"#, entries.join(","))
    }

    struct CannedHttp {
        body: String,
        urls: Vec<String>,
    }

    impl HttpFetch for CannedHttp {
        fn get(&mut self, url: &str) -> Result<String> {
            self.urls.push(url.to_string());
            Ok(self.body.clone())
        }
    }

    #[test]
    fn parses_current_conditions() {
        let c = parse_current(CURRENT_JSON).unwrap();
        assert_eq!(c.location, "Zurich");
        assert_eq!(c.icon, WeatherIcon::Rain);
        assert_eq!(c.description, "light rain");
        assert_eq!(c.humidity, 81);
        assert_eq!(c.pressure_hpa, 1012);
        assert_eq!(c.clouds, 75);
        assert_eq!(c.visibility_m, 10_000);
        assert_eq!(c.sunrise, 1_699_942_000);
    }

    #[test]
    fn api_error_body_is_rejected() {
        let err = parse_current(r#"{"cod":401,"message":"Invalid API key"}"#).unwrap_err();
        assert!(err.to_string().contains("Invalid API key"));
        assert!(parse_forecast(r#"{"cod":"401"}"#, 12, &ALLOWED_FORECAST_HOURS).is_err());
        assert!(parse_current("not json").is_err());
    }

    #[test]
    fn forecast_keeps_only_allowed_hours() {
        let list = parse_forecast(&forecast_json(8), 12, &ALLOWED_FORECAST_HOURS).unwrap();
        let hours: Vec<u8> = list.iter().map(|f| utc_hour(f.observation_time)).collect();
        assert_eq!(hours, vec![0, 12, 0, 12]);
        assert_eq!(list[1].temp, 2.0);
        assert_eq!(list[0].rain, 0.5);
    }

    #[test]
    fn forecast_is_capped() {
        let list = parse_forecast(&forecast_json(80), 50, &ALLOWED_FORECAST_HOURS).unwrap();
        assert_eq!(list.len(), MAX_FORECASTS);
        let list = parse_forecast(&forecast_json(80), 5, &ALLOWED_FORECAST_HOURS).unwrap();
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn utc_hour_handles_negative_epochs() {
        assert_eq!(utc_hour(0), 0);
        assert_eq!(utc_hour(13 * 3600 + 59), 13);
        assert_eq!(utc_hour(-3600), 23);
    }

    #[test]
    fn client_builds_owm_urls() {
        let http = CannedHttp { body: CURRENT_JSON.to_string(), urls: Vec::new() };
        let mut client = OwmClient::new(http, false, "de");
        client.fetch_current("KEY", "2657896").unwrap();
        assert_eq!(
            client.http.urls[0],
            "https://api.openweathermap.org/data/2.5/weather?id=2657896&appid=KEY&units=imperial&lang=de"
        );
    }

    #[test]
    fn client_filters_forecast() {
        let http = CannedHttp { body: forecast_json(4), urls: Vec::new() };
        let mut client = OwmClient::new(http, true, "en");
        let list = client.fetch_forecast("KEY", "1", 12, &[12]).unwrap();
        assert_eq!(list.len(), 1);
        assert!(client.http.urls[0].contains("/forecast?id=1&appid=KEY&units=metric"));
    }
}
