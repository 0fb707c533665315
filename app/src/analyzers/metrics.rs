// ==============================================================================
// metrics.rs - Recent Health Metrics Analyzer
// ==============================================================================
// Description: Evaluates the latest usable reading of each vital/activity metric
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================
// Reading selection:
//   1. Readings outside the metric's measurable range are either dropped as
//      device/entry errors or, on a dangerous side, kept as critical
//   2. If any kept reading has a timestamp, use the latest timestamped reading
//   3. Otherwise use the last kept reading in input order
// Metrics are evaluated in input order; unknown metric names are ignored.
// ==============================================================================

use tracing::{debug, warn};

use crate::models::{Emission, HealthMetrics, MetricReading, Priority};

type Evaluation = Option<(Priority, String)>;

/// Treatment of a reading beyond one edge of the measurable range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Beyond {
    /// Not physically meaningful; dropped with a warning
    Implausible,
    /// Dangerous extreme; always critical
    Critical,
}

use Beyond::{Critical, Implausible};

struct MetricRule {
    name: &'static str,
    label: &'static str,
    measurable: (f64, f64),
    below: Beyond,
    above: Beyond,
    evaluate: fn(f64) -> Evaluation,
}

const RULES: &[MetricRule] = &[
    MetricRule { name: "blood_pressure_systolic", label: "Systolic blood pressure", measurable: (70.0, 190.0), below: Critical, above: Critical, evaluate: systolic },
    MetricRule { name: "blood_pressure_diastolic", label: "Diastolic blood pressure", measurable: (40.0, 130.0), below: Critical, above: Critical, evaluate: diastolic },
    MetricRule { name: "heart_rate", label: "Heart rate", measurable: (40.0, 200.0), below: Critical, above: Critical, evaluate: heart_rate },
    MetricRule { name: "blood_oxygen", label: "Blood oxygen", measurable: (80.0, 100.0), below: Critical, above: Implausible, evaluate: blood_oxygen },
    MetricRule { name: "blood_glucose", label: "Blood glucose", measurable: (20.0, 600.0), below: Critical, above: Critical, evaluate: blood_glucose },
    MetricRule { name: "body_temperature", label: "Body temperature", measurable: (35.0, 42.0), below: Critical, above: Critical, evaluate: body_temperature },
    MetricRule { name: "bmi", label: "BMI", measurable: (10.0, 80.0), below: Critical, above: Critical, evaluate: bmi },
    MetricRule { name: "steps", label: "Daily step count", measurable: (0.0, 100_000.0), below: Implausible, above: Implausible, evaluate: steps },
    MetricRule { name: "sleep_duration", label: "Sleep duration", measurable: (0.0, 24.0), below: Implausible, above: Implausible, evaluate: sleep_duration },
];

/// Evaluate each known metric's most recent usable reading
pub fn analyze_health_metrics(metrics: &HealthMetrics) -> Vec<Emission> {
    let mut emissions = Vec::new();

    for (name, readings) in metrics.iter() {
        let Some(rule) = RULES.iter().find(|r| r.name == name) else {
            debug!("Ignoring unknown metric '{}'", name);
            continue;
        };

        let Some(reading) = latest_usable(rule, readings) else {
            continue;
        };

        if let Some((priority, text)) = rule.assess(reading.value) {
            debug!("Metric {} = {} → {:?}", name, reading.value, priority);
            emissions.push(Emission::with_priority(text, priority));
        }
    }

    emissions
}

impl MetricRule {
    /// Where `value` falls relative to the measurable range, if outside it
    fn beyond(&self, value: f64) -> Option<Beyond> {
        let (min, max) = self.measurable;
        if value < min {
            Some(self.below)
        } else if value > max {
            Some(self.above)
        } else {
            None
        }
    }

    fn assess(&self, value: f64) -> Evaluation {
        match self.beyond(value) {
            None => (self.evaluate)(value),
            Some(Critical) => Some((Priority::Critical, format!(
                "{} reading of {} is outside the measurable range; verify the measurement and seek medical care immediately",
                self.label, value))),
            Some(Implausible) => None,
        }
    }
}

fn latest_usable<'a>(rule: &MetricRule, readings: &'a [MetricReading]) -> Option<&'a MetricReading> {
    let usable: Vec<&MetricReading> = readings
        .iter()
        .filter(|r| {
            let implausible = rule.beyond(r.value) == Some(Implausible);
            if implausible {
                let (min, max) = rule.measurable;
                warn!(
                    "Skipping implausible {} reading {} (expected {}-{})",
                    rule.name, r.value, min, max
                );
            }
            !implausible
        })
        .collect();

    let timestamped = usable
        .iter()
        .copied()
        .filter(|r| r.timestamp.is_some())
        .max_by_key(|r| r.timestamp);

    timestamped.or_else(|| usable.last().copied())
}

fn systolic(v: f64) -> Evaluation {
    match v {
        v if v >= 180.0 => Some((Priority::Critical, format!(
            "Systolic blood pressure of {:.0} mmHg is in the hypertensive crisis range; seek medical care immediately", v))),
        v if v >= 140.0 => Some((Priority::Elevated, format!(
            "Systolic blood pressure of {:.0} mmHg is high; see your doctor about treatment", v))),
        v if v >= 130.0 => Some((Priority::Routine, format!(
            "Systolic blood pressure of {:.0} mmHg is elevated; recheck it regularly", v))),
        _ => None,
    }
}

fn diastolic(v: f64) -> Evaluation {
    match v {
        v if v >= 120.0 => Some((Priority::Critical, format!(
            "Diastolic blood pressure of {:.0} mmHg is in the hypertensive crisis range; seek medical care immediately", v))),
        v if v >= 90.0 => Some((Priority::Elevated, format!(
            "Diastolic blood pressure of {:.0} mmHg is high; see your doctor about treatment", v))),
        v if v >= 80.0 => Some((Priority::Routine, format!(
            "Diastolic blood pressure of {:.0} mmHg is elevated; recheck it regularly", v))),
        _ => None,
    }
}

fn heart_rate(v: f64) -> Evaluation {
    match v {
        v if v > 120.0 => Some((Priority::Elevated, format!(
            "Resting heart rate of {:.0} bpm is very high; contact your doctor", v))),
        v if v > 100.0 => Some((Priority::Routine, format!(
            "Resting heart rate of {:.0} bpm is above normal; monitor it and limit stimulants", v))),
        v if v < 50.0 => Some((Priority::Routine, format!(
            "Resting heart rate of {:.0} bpm is low; mention it at your next check-up if you feel dizzy or tired", v))),
        _ => None,
    }
}

fn blood_oxygen(v: f64) -> Evaluation {
    match v {
        v if v < 90.0 => Some((Priority::Critical, format!(
            "Blood oxygen of {:.0}% is dangerously low; seek medical care immediately", v))),
        v if v < 95.0 => Some((Priority::Elevated, format!(
            "Blood oxygen of {:.0}% is below normal; contact your doctor", v))),
        _ => None,
    }
}

fn blood_glucose(v: f64) -> Evaluation {
    match v {
        v if v < 54.0 => Some((Priority::Critical, format!(
            "Blood glucose of {:.0} mg/dL is dangerously low; take fast-acting sugar and seek care", v))),
        v if v < 70.0 => Some((Priority::Elevated, format!(
            "Blood glucose of {:.0} mg/dL is low; eat and recheck within 15 minutes", v))),
        v if v >= 250.0 => Some((Priority::Critical, format!(
            "Blood glucose of {:.0} mg/dL is very high; seek medical care promptly", v))),
        v if v >= 126.0 => Some((Priority::Elevated, format!(
            "Blood glucose of {:.0} mg/dL is in the diabetic range; see your doctor for testing", v))),
        v if v >= 100.0 => Some((Priority::Routine, format!(
            "Blood glucose of {:.0} mg/dL is above normal; recheck fasting glucose", v))),
        _ => None,
    }
}

fn body_temperature(v: f64) -> Evaluation {
    match v {
        v if v >= 39.5 => Some((Priority::Elevated, format!(
            "Body temperature of {:.1}°C is a high fever; contact your doctor", v))),
        v if v >= 38.0 => Some((Priority::Routine, format!(
            "Body temperature of {:.1}°C indicates a fever; rest, hydrate and monitor", v))),
        v if v < 35.5 => Some((Priority::Routine, format!(
            "Body temperature of {:.1}°C is low; warm up and recheck", v))),
        _ => None,
    }
}

fn bmi(v: f64) -> Evaluation {
    match v {
        v if v >= 35.0 => Some((Priority::Elevated, format!(
            "BMI of {:.1} is in the severe obesity range; discuss a weight management plan with your doctor", v))),
        v if v >= 25.0 => Some((Priority::Routine, format!(
            "BMI of {:.1} is above the healthy range; track weight and activity", v))),
        v if v < 18.5 => Some((Priority::Routine, format!(
            "BMI of {:.1} is below the healthy range; review nutrition with your doctor", v))),
        _ => None,
    }
}

fn steps(v: f64) -> Evaluation {
    (v < 5000.0).then(|| {
        (Priority::Routine, format!(
            "Daily step count of {:.0} is low; aim for at least 7,000 steps", v))
    })
}

fn sleep_duration(v: f64) -> Evaluation {
    (v < 6.0).then(|| {
        (Priority::Routine, format!(
            "Recent sleep of {:.1} hours is short; track sleep and aim for 7-9 hours", v))
    })
}
