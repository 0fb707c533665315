// ==============================================================================
// lifestyle.rs - Lifestyle Habit Analyzer
// ==============================================================================
// Description: Smoking, activity, diet, sleep, stress and substance checks
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================
// Checks run in a fixed order and never short-circuit:
//   smoking → exercise → diet → sleep → stress → alcohol → substance use
// Each check emits at most one recommendation; missing fields emit nothing.
// ==============================================================================

use tracing::debug;

use crate::models::{Emission, LifestyleData};

/// WHO guideline for moderate activity, minutes per week
pub const DEFAULT_EXERCISE_TARGET_MINUTES: f64 = 150.0;

const MIN_SLEEP_HOURS: f64 = 7.0;
const MAX_SLEEP_HOURS: f64 = 9.0;
const HIGH_STRESS_LEVEL: f64 = 7.0;
const MAX_ALCOHOL_UNITS_PER_WEEK: f64 = 14.0;

type LifestyleCheck = fn(&LifestyleData, f64) -> Option<String>;

const CHECKS: &[(&str, LifestyleCheck)] = &[
    ("smoking", check_smoking as LifestyleCheck),
    ("exercise", check_exercise as LifestyleCheck),
    ("diet", check_diet as LifestyleCheck),
    ("sleep", check_sleep as LifestyleCheck),
    ("stress", check_stress as LifestyleCheck),
    ("alcohol", check_alcohol as LifestyleCheck),
    ("substance_use", check_substance_use as LifestyleCheck),
];

/// Run every lifestyle check and concatenate the results in check order
pub fn analyze_lifestyle(data: &LifestyleData, exercise_target_minutes: f64) -> Vec<Emission> {
    CHECKS
        .iter()
        .filter_map(|(name, check)| {
            let advice = check(data, exercise_target_minutes)?;
            debug!("Lifestyle check '{}' triggered", name);
            Some(Emission::routine(advice))
        })
        .collect()
}

fn check_smoking(data: &LifestyleData, _: f64) -> Option<String> {
    data.smoking
        .filter(|smokes| *smokes)
        .map(|_| "Quit smoking; ask your doctor about cessation programs and nicotine replacement".to_string())
}

fn check_exercise(data: &LifestyleData, target: f64) -> Option<String> {
    data.exercise.filter(|minutes| *minutes < target).map(|minutes| {
        format!(
            "Increase physical activity to at least {:.0} minutes per week (currently {:.0})",
            target, minutes
        )
    })
}

fn check_diet(data: &LifestyleData, _: f64) -> Option<String> {
    data.diet
        .as_deref()
        .filter(|diet| diet.trim().eq_ignore_ascii_case("unhealthy"))
        .map(|_| "Improve your diet with more vegetables, fruit, whole grains and lean protein".to_string())
}

fn check_sleep(data: &LifestyleData, _: f64) -> Option<String> {
    if let Some(hours) = data.sleep_hours {
        if hours < MIN_SLEEP_HOURS {
            return Some(format!(
                "Aim for 7-9 hours of sleep per night (currently {:.1})",
                hours
            ));
        }
        if hours > MAX_SLEEP_HOURS {
            return Some(format!(
                "Regularly sleeping more than 9 hours ({:.1}) can signal an underlying issue; discuss with your doctor",
                hours
            ));
        }
    }

    data.sleep_quality
        .as_deref()
        .filter(|quality| quality.trim().eq_ignore_ascii_case("poor"))
        .map(|_| "Improve sleep hygiene: keep a consistent schedule and limit screens before bed".to_string())
}

fn check_stress(data: &LifestyleData, _: f64) -> Option<String> {
    data.stress_level
        .filter(|level| *level >= HIGH_STRESS_LEVEL)
        .map(|_| "Practice stress management such as mindfulness, breathing exercises or counseling".to_string())
}

fn check_alcohol(data: &LifestyleData, _: f64) -> Option<String> {
    data.alcohol_units_per_week
        .filter(|units| *units > MAX_ALCOHOL_UNITS_PER_WEEK)
        .map(|units| {
            format!(
                "Reduce alcohol to 14 units per week or fewer (currently {:.0})",
                units
            )
        })
}

fn check_substance_use(data: &LifestyleData, _: f64) -> Option<String> {
    data.substance_use
        .filter(|uses| *uses)
        .map(|_| "Seek support for substance use from a healthcare provider or support service".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(data: &LifestyleData) -> Vec<String> {
        analyze_lifestyle(data, DEFAULT_EXERCISE_TARGET_MINUTES)
            .into_iter()
            .map(|e| e.text)
            .collect()
    }

    #[test]
    fn test_low_exercise_recommends_activity() {
        let data = LifestyleData {
            exercise: Some(100.0),
            ..Default::default()
        };
        let recs = analyze(&data);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("Increase physical activity"));
    }

    #[test]
    fn test_sufficient_exercise_no_recommendation() {
        let data = LifestyleData {
            exercise: Some(200.0),
            ..Default::default()
        };
        assert!(analyze(&data).is_empty());

        let at_target = LifestyleData {
            exercise: Some(150.0),
            ..Default::default()
        };
        assert!(analyze(&at_target).is_empty());
    }

    #[test]
    fn test_smoking_always_recommends_cessation() {
        let data = LifestyleData {
            smoking: Some(true),
            exercise: Some(300.0),
            diet: Some("balanced".to_string()),
            ..Default::default()
        };
        let recs = analyze(&data);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].starts_with("Quit smoking"));

        let non_smoker = LifestyleData {
            smoking: Some(false),
            ..Default::default()
        };
        assert!(analyze(&non_smoker).is_empty());
    }

    #[test]
    fn test_checks_run_in_fixed_order() {
        let data = LifestyleData {
            substance_use: Some(true),
            diet: Some("Unhealthy".to_string()),
            smoking: Some(true),
            exercise: Some(30.0),
            sleep_hours: Some(5.0),
            stress_level: Some(8.0),
            alcohol_units_per_week: Some(20.0),
            sleep_quality: None,
        };
        let recs = analyze(&data);

        assert_eq!(recs.len(), 7);
        assert!(recs[0].starts_with("Quit smoking"));
        assert!(recs[1].starts_with("Increase physical activity"));
        assert!(recs[2].starts_with("Improve your diet"));
        assert!(recs[3].starts_with("Aim for 7-9 hours"));
        assert!(recs[4].starts_with("Practice stress management"));
        assert!(recs[5].starts_with("Reduce alcohol"));
        assert!(recs[6].starts_with("Seek support"));
    }

    #[test]
    fn test_sleep_emits_at_most_one() {
        let data = LifestyleData {
            sleep_hours: Some(5.5),
            sleep_quality: Some("poor".to_string()),
            ..Default::default()
        };
        assert_eq!(analyze(&data).len(), 1);

        let quality_only = LifestyleData {
            sleep_hours: Some(8.0),
            sleep_quality: Some("poor".to_string()),
            ..Default::default()
        };
        let recs = analyze(&quality_only);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("sleep hygiene"));
    }

    #[test]
    fn test_custom_exercise_target() {
        let data = LifestyleData {
            exercise: Some(200.0),
            ..Default::default()
        };
        assert_eq!(analyze_lifestyle(&data, 300.0).len(), 1);
    }
}
