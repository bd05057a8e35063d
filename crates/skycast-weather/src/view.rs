//! Display fields derived from a cached snapshot.

use std::fmt;

use chrono::{DateTime, TimeZone};

use crate::icons::{self, IconAsset};
use crate::types::WeatherSnapshot;
use crate::units;

/// Everything the rendering surface shows. `Default` is the empty state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherViewModel {
    pub has_data: bool,
    pub loading: bool,
    pub condition: String,
    pub description: String,
    /// Temperature with unit symbol, e.g. "24.5°C" or "24.0°C"
    pub temperature: String,
    pub temp_min: String,
    pub temp_max: String,
    pub humidity: String,
    pub wind_speed: String,
    pub location_name: String,
    pub country: String,
    /// Local "HH:mm"
    pub sunrise: String,
    pub sunset: String,
    pub icon: Option<IconAsset>,
}

impl WeatherViewModel {
    /// Overwrite the display fields from `snapshot`.
    ///
    /// The icon is only replaced when the snapshot's code is known. Sun times
    /// are shown in `tz`, using each timestamp's own offset.
    pub fn apply<Tz>(&mut self, snapshot: &WeatherSnapshot, region: &str, tz: &Tz)
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let unit = units::unit_symbol(region);
        let m = &snapshot.measurements;

        self.condition = snapshot.condition.main.clone();
        self.description = snapshot.condition.description.clone();
        self.temperature = format!("{}{}", decimal(m.temperature), unit);
        self.temp_min = decimal(m.temp_min);
        self.temp_max = decimal(m.temp_max);
        self.humidity = m.humidity.to_string();
        self.wind_speed = decimal(snapshot.wind.speed);
        self.location_name = snapshot.place.name.clone();
        self.country = snapshot.place.country.clone();
        self.sunrise = format_clock(snapshot.sun.sunrise, tz);
        self.sunset = format_clock(snapshot.sun.sunset, tz);
        self.icon = icons::next_icon(self.icon, &snapshot.condition.icon);
        self.has_data = true;
    }

    pub fn icon_id(&self) -> Option<&'static str> {
        self.icon.map(|icon| icon.asset_id())
    }
}

/// Measurements always keep a fractional part: `24.0`, not `24`.
fn decimal(value: f64) -> String {
    format!("{:?}", value)
}

/// "HH:mm" for a unix timestamp in `tz`.
pub fn format_clock<Tz>(epoch_secs: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    DateTime::from_timestamp(epoch_secs, 0)
        .map(|utc| utc.with_timezone(tz).format("%H:%M").to_string())
        .unwrap_or_default()
}
