// ==============================================================================
// validator.rs - Aggregate Input Validation
// ==============================================================================
// Description: Converts raw JSON into typed input and enforces value bounds
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// Security: Fan-out limits on every collection, fail-fast on first bad field
// ==============================================================================

use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::debug;

use crate::engine::EngineConfig;
use crate::error::ValidationError;
use crate::models::{
    AggregateInput, EnvironmentalData, GeneticData, GeneticEntry, HealthMetrics, LifestyleData,
    MedicalHistory, MetricReading, OrderedMap,
};

type Result<T> = std::result::Result<T, ValidationError>;

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Validates aggregate input before any analyzer runs
#[derive(Debug, Clone)]
pub struct InputValidator {
    max_genetic_entries: usize,
    max_lifestyle_keys: usize,
    max_list_entries: usize,
    max_metric_readings: usize,
}

impl InputValidator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_genetic_entries: config.max_genetic_entries,
            max_lifestyle_keys: config.max_lifestyle_keys,
            max_list_entries: config.max_list_entries,
            max_metric_readings: config.max_metric_readings,
        }
    }

    /// Convert a JSON document into typed input, then check bounds
    pub fn parse(&self, value: &Value) -> Result<AggregateInput> {
        let root = value
            .as_object()
            .ok_or_else(|| ValidationError::invalid_type("input", "an object"))?;

        for key in root.keys() {
            if !matches!(
                key.as_str(),
                "genetic_data" | "lifestyle_data" | "medical_history" | "environmental_data" | "health_metrics"
            ) {
                debug!("Ignoring unknown input key '{}'", key);
            }
        }

        let input = AggregateInput {
            genetic_data: present(root, "genetic_data")
                .map(|v| self.parse_genetic(v))
                .transpose()?,
            lifestyle_data: present(root, "lifestyle_data")
                .map(|v| self.parse_lifestyle(v))
                .transpose()?,
            medical_history: present(root, "medical_history")
                .map(|v| self.parse_medical(v))
                .transpose()?,
            environmental_data: present(root, "environmental_data")
                .map(|v| self.parse_environmental(v))
                .transpose()?,
            health_metrics: present(root, "health_metrics")
                .map(|v| self.parse_metrics(v))
                .transpose()?,
        };

        self.check(&input)?;
        Ok(input)
    }

    /// Check bounds and numeric ranges of already-typed input
    pub fn check(&self, input: &AggregateInput) -> Result<()> {
        if let Some(genetic) = &input.genetic_data {
            ensure_count("genetic_data", genetic.len(), self.max_genetic_entries)?;
            for (gene, _) in genetic.iter() {
                if gene.trim().is_empty() {
                    return Err(ValidationError::invalid_value("genetic_data", "empty gene identifier"));
                }
            }
        }

        if let Some(lifestyle) = &input.lifestyle_data {
            check_range("lifestyle_data.exercise", lifestyle.exercise, 0.0, f64::MAX)?;
            check_range("lifestyle_data.sleep_hours", lifestyle.sleep_hours, 0.0, 24.0)?;
            check_range("lifestyle_data.stress_level", lifestyle.stress_level, 0.0, 10.0)?;
            check_range(
                "lifestyle_data.alcohol_units_per_week",
                lifestyle.alcohol_units_per_week,
                0.0,
                f64::MAX,
            )?;
        }

        if let Some(history) = &input.medical_history {
            ensure_count(
                "medical_history.chronic_conditions",
                history.chronic_conditions.len(),
                self.max_list_entries,
            )?;
            ensure_count("medical_history.medications", history.medications.len(), self.max_list_entries)?;
            ensure_count(
                "medical_history.family_history",
                history.family_history.len(),
                self.max_list_entries,
            )?;
        }

        if let Some(env) = &input.environmental_data {
            check_range("environmental_data.air_quality", env.air_quality, 0.0, f64::MAX)?;
            check_range("environmental_data.uv_index", env.uv_index, 0.0, f64::MAX)?;
            check_range("environmental_data.noise_level", env.noise_level, 0.0, f64::MAX)?;
            check_range("environmental_data.ambient_temperature", env.ambient_temperature, -90.0, 60.0)?;
            check_range("environmental_data.humidity", env.humidity, 0.0, 100.0)?;
            ensure_count("environmental_data.exposures", env.exposures.len(), self.max_list_entries)?;
        }

        if let Some(metrics) = &input.health_metrics {
            let total: usize = metrics.iter().map(|(_, readings)| readings.len()).sum();
            ensure_count("health_metrics", total, self.max_metric_readings)?;
            for (name, readings) in metrics.iter() {
                for (i, reading) in readings.iter().enumerate() {
                    if !reading.value.is_finite() {
                        return Err(ValidationError::invalid_value(
                            format!("health_metrics.{}[{}].value", name, i),
                            "must be a finite number",
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    fn parse_genetic(&self, value: &Value) -> Result<GeneticData> {
        let map = as_object("genetic_data", value)?;
        ensure_count("genetic_data", map.len(), self.max_genetic_entries)?;

        map.iter()
            .map(|(gene, entry)| {
                let field = format!("genetic_data.{}", gene);
                let entry = as_object(&field, entry)?;
                let variant = opt_string(&format!("{}.variant", field), entry.get("variant"))?;
                Ok((gene.clone(), GeneticEntry { variant }))
            })
            .collect()
    }

    fn parse_lifestyle(&self, value: &Value) -> Result<LifestyleData> {
        let map = as_object("lifestyle_data", value)?;
        ensure_count("lifestyle_data", map.len(), self.max_lifestyle_keys)?;

        let field = |key: &str| (format!("lifestyle_data.{}", key), map.get(key));

        Ok(LifestyleData {
            smoking: opt_bool_field(field("smoking"))?,
            exercise: opt_number_field(field("exercise"))?,
            diet: opt_string_field(field("diet"))?,
            sleep_hours: opt_number_field(field("sleep_hours"))?,
            sleep_quality: opt_string_field(field("sleep_quality"))?,
            stress_level: opt_number_field(field("stress_level"))?,
            alcohol_units_per_week: opt_number_field(field("alcohol_units_per_week"))?,
            substance_use: opt_bool_field(field("substance_use"))?,
        })
    }

    fn parse_medical(&self, value: &Value) -> Result<MedicalHistory> {
        let map = as_object("medical_history", value)?;

        let family_history = match map.get("family_history") {
            None | Some(Value::Null) => OrderedMap::new(),
            Some(Value::Object(entries)) => {
                ensure_count("medical_history.family_history", entries.len(), self.max_list_entries)?;
                entries
                    .iter()
                    .map(|(condition, relatives)| {
                        let field = format!("medical_history.family_history.{}", condition);
                        Ok((condition.clone(), self.string_list(&field, Some(relatives))?))
                    })
                    .collect::<Result<_>>()?
            }
            // A bare list names conditions without relatives
            Some(list @ Value::Array(_)) => self
                .string_list("medical_history.family_history", Some(list))?
                .into_iter()
                .map(|condition| (condition, Vec::new()))
                .collect(),
            Some(_) => {
                return Err(ValidationError::invalid_type(
                    "medical_history.family_history",
                    "an object or an array of strings",
                ))
            }
        };

        Ok(MedicalHistory {
            chronic_conditions: self
                .string_list("medical_history.chronic_conditions", map.get("chronic_conditions"))?,
            medications: self.string_list("medical_history.medications", map.get("medications"))?,
            family_history,
        })
    }

    fn parse_environmental(&self, value: &Value) -> Result<EnvironmentalData> {
        let map = as_object("environmental_data", value)?;
        let field = |key: &str| (format!("environmental_data.{}", key), map.get(key));

        Ok(EnvironmentalData {
            air_quality: opt_number_field(field("air_quality"))?,
            uv_index: opt_number_field(field("uv_index"))?,
            noise_level: opt_number_field(field("noise_level"))?,
            ambient_temperature: opt_number_field(field("ambient_temperature"))?,
            humidity: opt_number_field(field("humidity"))?,
            exposures: self.string_list("environmental_data.exposures", map.get("exposures"))?,
        })
    }

    fn parse_metrics(&self, value: &Value) -> Result<HealthMetrics> {
        let map = as_object("health_metrics", value)?;
        let mut metrics = HealthMetrics::new();
        let mut total = 0;

        for (name, value) in map {
            let field = format!("health_metrics.{}", name);
            let readings = match value {
                Value::Null => continue,
                Value::Array(items) => {
                    total += items.len();
                    ensure_count("health_metrics", total, self.max_metric_readings)?;
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| parse_reading(&format!("{}[{}]", field, i), item))
                        .collect::<Result<Vec<_>>>()?
                }
                single => {
                    total += 1;
                    ensure_count("health_metrics", total, self.max_metric_readings)?;
                    vec![parse_reading(&field, single)?]
                }
            };
            metrics.insert(name.clone(), readings);
        }

        Ok(metrics)
    }

    fn string_list(&self, field: &str, value: Option<&Value>) -> Result<Vec<String>> {
        let items = match value {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(ValidationError::invalid_type(field, "an array of strings")),
        };

        ensure_count(field, items.len(), self.max_list_entries)?;

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ValidationError::invalid_type(format!("{}[{}]", field, i), "a string"))
            })
            .collect()
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl AggregateInput {
    /// Build typed input from a JSON document using default limits
    pub fn from_json(value: &Value) -> Result<Self> {
        InputValidator::default().parse(value)
    }
}

/// Domain payload if present and not null
fn present<'a>(root: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    root.get(key).filter(|v| !v.is_null())
}

fn as_object<'a>(field: &str, value: &'a Value) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| ValidationError::invalid_type(field, "an object"))
}

fn ensure_count(field: &str, count: usize, max: usize) -> Result<()> {
    if count > max {
        return Err(ValidationError::TooManyEntries {
            field: field.to_string(),
            count,
            max,
        });
    }
    Ok(())
}

fn check_range(field: &str, value: Option<f64>, min: f64, max: f64) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() => Err(ValidationError::invalid_value(field, "must be a finite number")),
        Some(v) if v < min || v > max => Err(ValidationError::invalid_value(
            field,
            format!("{} is outside {}..={}", v, min, max),
        )),
        _ => Ok(()),
    }
}

fn opt_string(field: &str, value: Option<&Value>) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::invalid_type(field, "a string")),
    }
}

fn opt_string_field((field, value): (String, Option<&Value>)) -> Result<Option<String>> {
    opt_string(&field, value)
}

fn opt_number_field((field, value): (String, Option<&Value>)) -> Result<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| ValidationError::invalid_type(field, "a number")),
    }
}

fn opt_bool_field((field, value): (String, Option<&Value>)) -> Result<Option<bool>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ValidationError::invalid_type(field, "a boolean")),
    }
}

fn parse_reading(field: &str, value: &Value) -> Result<MetricReading> {
    if let Some(number) = value.as_f64() {
        return Ok(MetricReading::new(number));
    }

    let map = value
        .as_object()
        .ok_or_else(|| ValidationError::invalid_type(field, "a number or a reading object"))?;

    let value = map
        .get("value")
        .and_then(Value::as_f64)
        .ok_or_else(|| ValidationError::invalid_type(format!("{}.value", field), "a number"))?;

    let timestamp = opt_string(&format!("{}.timestamp", field), map.get("timestamp"))?
        .map(|ts| parse_timestamp(&format!("{}.timestamp", field), &ts))
        .transpose()?;

    Ok(MetricReading { value, timestamp })
}

/// RFC 3339 timestamps are normalized to UTC; naive ISO timestamps are taken as-is
fn parse_timestamp(field: &str, value: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_utc());
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| ValidationError::invalid_value(field, format!("unrecognized timestamp '{}'", value)))
}
