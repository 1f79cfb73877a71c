use serde::{Deserialize, Serialize};

use crate::profile::models::ProfileData;

/// The three setup wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStep {
    EssentialPregnancy,
    MedicalHistory,
    LifestyleDemographics,
}

impl SetupStep {
    pub const ALL: [SetupStep; 3] = [
        SetupStep::EssentialPregnancy,
        SetupStep::MedicalHistory,
        SetupStep::LifestyleDemographics,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SetupStep::EssentialPregnancy => "Essential Pregnancy Information",
            SetupStep::MedicalHistory => "Medical History",
            SetupStep::LifestyleDemographics => "Lifestyle and Demographics",
        }
    }

    /// Required fields of this step that `data` does not yet satisfy.
    pub fn missing_fields(self, data: &ProfileData) -> Vec<&'static str> {
        let mut missing = Vec::new();
        match self {
            SetupStep::EssentialPregnancy => {
                if data.last_period.is_none() {
                    missing.push("last_period");
                }
                if data.conception_type.is_none() {
                    missing.push("conception_type");
                }
                if data.is_multiple_pregnancy() && data.number_of_babies.unwrap_or(0) < 2 {
                    missing.push("number_of_babies");
                }
            }
            // Medical history has no required fields
            SetupStep::MedicalHistory => {}
            SetupStep::LifestyleDemographics => {
                if data.age.unwrap_or(0) == 0 {
                    missing.push("age");
                }
                if data.weight_category.is_none() {
                    missing.push("weight_category");
                }
                if data.activity_level.is_none() {
                    missing.push("activity_level");
                }
            }
        }
        missing
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub step: SetupStep,
    pub title: String,
    pub complete: bool,
    pub missing_fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupReport {
    pub profile_completed: bool,
    /// First step that still needs input, if any.
    pub next_step: Option<SetupStep>,
    pub steps: Vec<StepReport>,
}

/// True only when every required field across all setup steps is populated.
pub fn is_complete(data: &ProfileData) -> bool {
    SetupStep::ALL
        .iter()
        .all(|step| step.missing_fields(data).is_empty())
}

pub fn compute_setup_report(data: &ProfileData) -> SetupReport {
    let steps: Vec<StepReport> = SetupStep::ALL
        .iter()
        .map(|&step| {
            let missing = step.missing_fields(data);
            StepReport {
                step,
                title: step.title().to_string(),
                complete: missing.is_empty(),
                missing_fields: missing.into_iter().map(String::from).collect(),
            }
        })
        .collect();

    let next_step = steps.iter().find(|s| !s.complete).map(|s| s.step);

    SetupReport {
        profile_completed: next_step.is_none(),
        next_step,
        steps,
    }
}
