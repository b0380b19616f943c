use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    conditions::ConditionLabel,
    irrigation::{Forecast, ForecastSource, IrrigationAdvisory},
    sensors::models::{ReadingSource, SensorReading},
    snapshot_cache::{AdvisorySnapshot, SensorSnapshot},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SensorReadingDto {
    /// Raw soil-moisture probe value
    pub soil_moisture: f64,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    pub taken_at: DateTime<Utc>,
}

impl From<SensorReading> for SensorReadingDto {
    fn from(r: SensorReading) -> Self {
        Self {
            soil_moisture: r.soil_moisture,
            temperature: r.temperature,
            humidity: r.humidity,
            taken_at: r.taken_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConditionDto {
    pub label: ConditionLabel,
    /// Badge color: green, orange, red or blue.
    pub color: String,
    pub title: String,
    pub description: String,
}

impl From<ConditionLabel> for ConditionDto {
    fn from(label: ConditionLabel) -> Self {
        Self {
            label,
            color: label.color().to_owned(),
            title: label.title().to_owned(),
            description: label.description().to_owned(),
        }
    }
}

/// Response for `GET /sensors/latest`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LatestReadingDto {
    /// `null` when the reading is synthetic.
    pub device_id: Option<String>,
    pub reading: SensorReadingDto,
    pub condition: ConditionDto,
    pub source: ReadingSource,
    pub updated_at: DateTime<Utc>,
}

impl From<SensorSnapshot> for LatestReadingDto {
    fn from(s: SensorSnapshot) -> Self {
        Self {
            device_id: s.device_id,
            condition: s.reading.condition().into(),
            reading: s.reading.into(),
            source: s.source,
            updated_at: s.updated_at,
        }
    }
}

/// Response for `GET /sensors/history`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryDto {
    pub device_id: Option<String>,
    pub source: ReadingSource,
    /// Ordered oldest first.
    pub readings: Vec<SensorReadingDto>,
}

impl From<SensorSnapshot> for HistoryDto {
    fn from(s: SensorSnapshot) -> Self {
        Self {
            device_id: s.device_id,
            source: s.source,
            readings: s.history.into_iter().map(Into::into).collect(),
        }
    }
}

/// Request body for `POST /conditions/classify`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClassifyRequest {
    /// Degrees Celsius
    pub temperature: f64,
    pub soil_moisture: f64,
}

/// Response for `GET /irrigation/advisory`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdvisoryDto {
    pub needed: bool,
    pub advice: String,
    pub forecast: Forecast,
    pub source: ForecastSource,
    pub updated_at: DateTime<Utc>,
}

impl From<AdvisorySnapshot> for AdvisoryDto {
    fn from(s: AdvisorySnapshot) -> Self {
        let IrrigationAdvisory { needed, advice } = s.advisory;
        Self {
            needed,
            advice,
            forecast: s.forecast,
            source: s.source,
            updated_at: s.updated_at,
        }
    }
}
