// ==============================================================================
// environmental.rs - Environmental Exposure Analyzer
// ==============================================================================
// Description: Air quality, UV, noise, temperature, humidity and hazard checks
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use tracing::debug;

use crate::models::{Emission, EnvironmentalData};

const HAZARDS: &[(&str, &str)] = &[
    ("asbestos", "Avoid disturbing asbestos-containing material and ask about lung screening"),
    ("radon", "Test your home for radon and install mitigation if levels are high"),
    ("benzene", "Limit benzene exposure with ventilation and protective equipment at work"),
    ("silica", "Use respiratory protection around silica dust"),
    ("secondhand_smoke", "Avoid secondhand smoke and keep your home smoke-free"),
    ("mold", "Remove indoor mold and keep humidity under control"),
    ("lead", "Test for lead in water and paint and ask about a blood lead test"),
];

/// Environmental checks in fixed order; every result is preventive advice
pub fn analyze_environmental(data: &EnvironmentalData) -> Vec<Emission> {
    let mut advice = Vec::new();

    if let Some(aqi) = data.air_quality {
        if aqi > 150.0 {
            advice.push(format!("Air quality is unhealthy (AQI {:.0}); avoid outdoor exertion and consider a mask", aqi));
        } else if aqi > 100.0 {
            advice.push(format!("Air quality is poor for sensitive groups (AQI {:.0}); limit prolonged outdoor activity", aqi));
        }
    }

    if let Some(uv) = data.uv_index {
        if uv >= 8.0 {
            advice.push("UV index is very high; avoid midday sun and wear protective clothing".to_string());
        } else if uv >= 3.0 {
            advice.push("Apply broad-spectrum SPF 30+ sunscreen when outdoors".to_string());
        }
    }

    if let Some(db) = data.noise_level.filter(|db| *db > 85.0) {
        advice.push(format!("Use hearing protection in loud environments ({:.0} dB)", db));
    }

    if let Some(temperature) = data.ambient_temperature {
        if temperature >= 32.0 {
            advice.push("Stay hydrated and avoid strenuous activity during hot weather".to_string());
        } else if temperature <= 0.0 {
            advice.push("Dress in layers and limit time outdoors in freezing weather".to_string());
        }
    }

    if let Some(humidity) = data.humidity {
        if !(30.0..=70.0).contains(&humidity) {
            advice.push(format!(
                "Keep indoor humidity between 30% and 70% (currently {:.0}%)",
                humidity
            ));
        }
    }

    for exposure in &data.exposures {
        let key = exposure.trim().to_lowercase().replace([' ', '-'], "_");
        match HAZARDS.iter().find(|(hazard, _)| *hazard == key) {
            Some((_, text)) => advice.push(text.to_string()),
            None => debug!("Ignoring unknown exposure '{}'", exposure),
        }
    }

    advice.into_iter().map(Emission::routine).collect()
}
