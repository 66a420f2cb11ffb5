// Open-Meteo forecast (`current_weather=true`) → WeatherReport.

use serde::Deserialize;
use serde_json::Value;

use super::NormalizeError;
use crate::record::weather::{describe_wmo_code, WeatherReport};

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeather>,
    current: Option<Current>,
}

/// Legacy `current_weather` block.
#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    windspeed: f64,
    weathercode: u32,
}

/// Newer `current=temperature_2m,...` block.
#[derive(Debug, Deserialize)]
struct Current {
    temperature_2m: f64,
    wind_speed_10m: f64,
    weather_code: u32,
}

/// Normalize a forecast payload into a single current-conditions record.
pub fn normalize_weather(payload: Value) -> Result<Vec<WeatherReport>, NormalizeError> {
    let response: ForecastResponse = serde_json::from_value(payload)?;

    let (temperature_c, wind_kph, code) = match (response.current_weather, response.current) {
        (Some(cw), _) => (cw.temperature, cw.windspeed, cw.weathercode),
        (None, Some(c)) => (c.temperature_2m, c.wind_speed_10m, c.weather_code),
        (None, None) => return Err(NormalizeError::MissingField("current_weather")),
    };

    Ok(vec![WeatherReport {
        temperature_c,
        wind_kph,
        condition: describe_wmo_code(code).to_string(),
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_current_weather_block() {
        let payload = json!({
            "latitude": 29.65,
            "current_weather": { "temperature": 27.5, "windspeed": 9.4, "weathercode": 2, "time": "2025-04-07T18:00" }
        });
        let reports = normalize_weather(payload).unwrap();
        assert_eq!(reports.len(), 1);
        assert!((reports[0].temperature_c - 27.5).abs() < f64::EPSILON);
        assert_eq!(reports[0].condition, "Partly cloudy");
    }

    #[test]
    fn current_block() {
        let payload = json!({
            "current": { "temperature_2m": 18.0, "wind_speed_10m": 4.0, "weather_code": 61 }
        });
        let reports = normalize_weather(payload).unwrap();
        assert_eq!(reports[0].condition, "Rain");
    }

    #[test]
    fn missing_block_is_an_error() {
        let err = normalize_weather(json!({ "error": true, "reason": "bad latitude" })).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingField("current_weather")));
    }
}
