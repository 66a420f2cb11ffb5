// Countdown to the next tip-off.
//
//   [ 02 Days ] [ 03 Hours ] [ 04 Mins ] [ 05 Secs ]
// or the "started" message once the target has passed.

use courtside_core::countdown::CountdownView;

use super::{empty_message, escape};
use crate::region::RegionUpdate;

pub const STARTED: &str = "The game has started!";
pub const NO_TARGET: &str = "Next game to be announced.";

/// `label` describes the target game, e.g. "vs Auburn Tigers".
pub fn render(view: Option<CountdownView>, label: Option<&str>) -> RegionUpdate {
    let body = match view {
        None => empty_message(NO_TARGET),
        Some(CountdownView::Started) => {
            format!("<div class=\"countdown-started\"><h3>{STARTED}</h3></div>")
        }
        Some(CountdownView::Remaining {
            days,
            hours,
            minutes,
            seconds,
        }) => {
            let mut html = String::from("<div class=\"countdown\">");
            if let Some(label) = label {
                html.push_str(&format!(
                    "<p class=\"countdown-label\">{}</p>",
                    escape(label)
                ));
            }
            for (value, unit) in [
                (days, "Days"),
                (hours, "Hours"),
                (minutes, "Mins"),
                (seconds, "Secs"),
            ] {
                html.push_str(&format!(
                    "<div class=\"countdown-item\"><span class=\"countdown-number\">{value:02}</span>\
                     <span class=\"countdown-unit\">{unit}</span></div>"
                ));
            }
            html.push_str("</div>");
            html
        }
    };
    RegionUpdate::Replace(body)
}
