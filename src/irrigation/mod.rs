//! Irrigation advisory derived from a three-day precipitation forecast.
//!
//! Rules, evaluated in order (first match wins):
//!
//! | Order | Condition                                       | Irrigate |
//! |-------|-------------------------------------------------|----------|
//! | 1     | tomorrow > 5 mm or > 60 %                       | no       |
//! | 2     | tomorrow > 2 mm or > 40 %                       | no       |
//! | 3     | day after > 5 mm or > 60 %                      | yes      |
//! | 4     | otherwise                                       | yes      |

pub mod service;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Millimetres.
pub const HEAVY_RAIN_MM: f64 = 5.0;
/// Millimetres.
pub const LIGHT_RAIN_MM: f64 = 2.0;
/// Percent.
pub const HEAVY_RAIN_PROBABILITY: u8 = 60;
/// Percent.
pub const LIGHT_RAIN_PROBABILITY: u8 = 40;

pub const ADVICE_RAIN_TOMORROW: &str = "rain expected tomorrow.";
pub const ADVICE_LIGHT_RAIN_TOMORROW: &str = "light rain possible tomorrow, monitor.";
pub const ADVICE_RAIN_IN_TWO_DAYS: &str =
    "rain expected in 2 days, light irrigation recommended today.";
pub const ADVICE_NO_RAIN: &str =
    "no rain expected for 2–3 days, irrigation strongly recommended.";

/// Precipitation outlook for a single day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DayForecast {
    /// Total precipitation in millimetres.
    pub precipitation: f64,
    /// Maximum precipitation probability, 0–100 %.
    pub probability: u8,
}

impl DayForecast {
    pub const fn new(precipitation: f64, probability: u8) -> Self {
        Self { precipitation, probability }
    }

    fn exceeds(&self, mm: f64, percent: u8) -> bool {
        self.precipitation > mm || self.probability > percent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Forecast {
    pub today: DayForecast,
    pub tomorrow: DayForecast,
    pub day_after: DayForecast,
}

impl Forecast {
    /// Substituted when the weather provider cannot be reached. Evaluates to
    /// "irrigation strongly recommended".
    pub const FALLBACK: Forecast = Forecast {
        today: DayForecast::new(0.0, 0),
        tomorrow: DayForecast::new(1.2, 25),
        day_after: DayForecast::new(3.5, 45),
    };
}

/// Where the forecast behind an advisory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForecastSource {
    Live,
    /// [`Forecast::FALLBACK`] substituted after a failed fetch.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IrrigationAdvisory {
    pub needed: bool,
    pub advice: String,
}

impl IrrigationAdvisory {
    fn new(needed: bool, advice: &str) -> Self {
        Self {
            needed,
            advice: advice.to_owned(),
        }
    }
}

/// Decide whether to irrigate today. `today` does not influence the decision.
pub fn evaluate(forecast: &Forecast) -> IrrigationAdvisory {
    let Forecast { tomorrow, day_after, .. } = forecast;

    if tomorrow.exceeds(HEAVY_RAIN_MM, HEAVY_RAIN_PROBABILITY) {
        IrrigationAdvisory::new(false, ADVICE_RAIN_TOMORROW)
    } else if tomorrow.exceeds(LIGHT_RAIN_MM, LIGHT_RAIN_PROBABILITY) {
        IrrigationAdvisory::new(false, ADVICE_LIGHT_RAIN_TOMORROW)
    } else if day_after.exceeds(HEAVY_RAIN_MM, HEAVY_RAIN_PROBABILITY) {
        IrrigationAdvisory::new(true, ADVICE_RAIN_IN_TWO_DAYS)
    } else {
        IrrigationAdvisory::new(true, ADVICE_NO_RAIN)
    }
}
