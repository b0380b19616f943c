//! Field condition classification.
//!
//! Maps a temperature / soil-moisture pair to one coarse label used for the
//! dashboard badge. Rules are evaluated in order and the first match wins, so
//! high soil moisture is reported even when the temperature alone would be
//! `Hot`.
//!
//! | Order | Rule                  | Label          | Color  |
//! |-------|-----------------------|----------------|--------|
//! | 1     | soil moisture > 500   | `HighMoisture` | blue   |
//! | 2     | temperature > 30 °C   | `Hot`          | red    |
//! | 3     | temperature > 26 °C   | `Warm`         | orange |
//! | 4     | otherwise             | `Optimal`      | green  |

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Soil moisture above which the field is flagged as waterlogged.
pub const HIGH_MOISTURE_THRESHOLD: f64 = 500.0;
/// Degrees Celsius.
pub const HOT_THRESHOLD: f64 = 30.0;
/// Degrees Celsius.
pub const WARM_THRESHOLD: f64 = 26.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionLabel {
    Optimal,
    Warm,
    Hot,
    HighMoisture,
}

impl ConditionLabel {
    /// Display color for the UI badge.
    pub fn color(&self) -> &'static str {
        match self {
            ConditionLabel::Optimal => "green",
            ConditionLabel::Warm => "orange",
            ConditionLabel::Hot => "red",
            ConditionLabel::HighMoisture => "blue",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ConditionLabel::Optimal => "Optimal",
            ConditionLabel::Warm => "Warm",
            ConditionLabel::Hot => "Hot",
            ConditionLabel::HighMoisture => "High Moisture",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConditionLabel::Optimal => "Growing conditions are within the optimal range",
            ConditionLabel::Warm => "Temperature is elevated, watch for heat stress",
            ConditionLabel::Hot => "Temperature is high, crops are at risk of heat stress",
            ConditionLabel::HighMoisture => "Soil is saturated, hold off on irrigation",
        }
    }
}

/// Classify the current field condition. Inputs must be finite.
pub fn classify(temperature: f64, soil_moisture: f64) -> ConditionLabel {
    if soil_moisture > HIGH_MOISTURE_THRESHOLD {
        ConditionLabel::HighMoisture
    } else if temperature > HOT_THRESHOLD {
        ConditionLabel::Hot
    } else if temperature > WARM_THRESHOLD {
        ConditionLabel::Warm
    } else {
        ConditionLabel::Optimal
    }
}
