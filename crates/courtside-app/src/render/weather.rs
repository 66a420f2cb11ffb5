// Game-day weather widget.

use courtside_core::record::WeatherReport;

use super::{empty_message, escape};
use crate::region::RegionUpdate;

pub const EMPTY_WEATHER: &str = "Weather unavailable.";

pub fn render(reports: &[WeatherReport], place: &str) -> RegionUpdate {
    let Some(report) = reports.first() else {
        return RegionUpdate::Replace(empty_message(EMPTY_WEATHER));
    };
    RegionUpdate::Replace(format!(
        "<div class=\"weather\">\
         <small class=\"text-muted\">{place}</small>\
         <div class=\"weather-temp\">{temp_f:.0}&deg;F <small>({temp_c:.0}&deg;C)</small></div>\
         <div class=\"weather-condition\">{condition}</div>\
         <small>Wind {wind:.0} km/h</small>\
         </div>",
        place = escape(place),
        temp_f = report.temperature_f(),
        temp_c = report.temperature_c,
        condition = escape(&report.condition),
        wind = report.wind_kph,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_both_scales() {
        let report = WeatherReport {
            temperature_c: 30.0,
            wind_kph: 12.4,
            condition: "Partly cloudy".into(),
        };
        let RegionUpdate::Replace(html) = render(&[report], "Gainesville") else {
            panic!("expected content");
        };
        assert!(html.contains("86&deg;F"));
        assert!(html.contains("(30&deg;C)"));
        assert!(html.contains("Partly cloudy"));
        assert!(html.contains("Wind 12 km/h"));
        assert!(html.contains("Gainesville"));
    }

    #[test]
    fn empty_renders_message() {
        let RegionUpdate::Replace(html) = render(&[], "Gainesville") else {
            panic!("expected message");
        };
        assert!(html.contains(EMPTY_WEATHER));
    }
}
