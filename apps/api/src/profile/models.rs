use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Declares a closed set of profile options whose wire value is also the
/// human-readable label rendered into prompts.
macro_rules! labeled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }
    };
}

labeled_enum!(ConceptionType {
    Natural => "Natural Conception",
    Iui => "IUI (Intrauterine Insemination)",
    Ivf => "IVF (In Vitro Fertilization)",
    DonorEgg => "Donor Egg",
    DonorSperm => "Donor Sperm",
    DonorEmbryo => "Donor Embryo",
    Other => "Other/Prefer not to say",
});

labeled_enum!(PregnancyType {
    Single => "single",
    Multiple => "multiple",
});

labeled_enum!(PreExistingCondition {
    Diabetes => "Diabetes",
    Hypertension => "Hypertension",
    ThyroidDisorders => "Thyroid Disorders",
    AutoimmuneDiseases => "Autoimmune Diseases",
    HeartConditions => "Heart Conditions",
    KidneyDisease => "Kidney Disease",
});

labeled_enum!(PregnancyComplication {
    Preeclampsia => "Preeclampsia",
    GestationalDiabetes => "Gestational Diabetes",
    PrematureBirth => "Premature Birth",
    Miscarriages => "Miscarriages",
    Stillbirth => "Stillbirth",
    PostpartumHemorrhage => "Postpartum Hemorrhage",
});

labeled_enum!(BloodType {
    APositive => "A+",
    ANegative => "A-",
    BPositive => "B+",
    BNegative => "B-",
    AbPositive => "AB+",
    AbNegative => "AB-",
    OPositive => "O+",
    ONegative => "O-",
    Unknown => "Unknown",
});

labeled_enum!(WeightCategory {
    Underweight => "Underweight (BMI < 18.5)",
    Normal => "Normal weight (BMI 18.5-24.9)",
    Overweight => "Overweight (BMI 25-29.9)",
    Obese => "Obese (BMI ≥ 30)",
    PreferNotToSay => "Prefer not to say",
});

labeled_enum!(SubstanceUse {
    Smoking => "Smoking",
    Alcohol => "Alcohol",
    RecreationalDrugs => "Recreational Drugs",
    None => "None",
});

labeled_enum!(ActivityLevel {
    Sedentary => "Sedentary (little to no exercise)",
    Light => "Light (1-3 days/week)",
    Moderate => "Moderate (3-5 days/week)",
    Active => "Active (6-7 days/week)",
    VeryActive => "Very Active (intense daily exercise)",
});

labeled_enum!(DietaryRestriction {
    Vegetarian => "Vegetarian",
    Vegan => "Vegan",
    GlutenFree => "Gluten-Free",
    DairyFree => "Dairy-Free",
    Kosher => "Kosher",
    Halal => "Halal",
    None => "None",
});

labeled_enum!(WorkPhysicalDemand {
    Sedentary => "Sedentary (desk work)",
    Light => "Light (occasional standing/walking)",
    Moderate => "Moderate (frequent standing/walking)",
    Heavy => "Heavy (lifting, physical labor)",
});

/// The user-editable part of a profile, filled in over the three setup steps.
/// Every field may be absent on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileData {
    // Essential pregnancy information
    #[serde(deserialize_with = "lenient_date")]
    pub last_period: Option<NaiveDate>,
    pub previous_pregnancies: Option<u32>,
    pub conception_type: Option<ConceptionType>,
    pub pregnancy_type: Option<PregnancyType>,
    pub number_of_babies: Option<u32>,

    // Medical history
    pub pre_existing_conditions: Vec<PreExistingCondition>,
    pub previous_pregnancy_complications: Vec<PregnancyComplication>,
    pub current_complications: Option<String>,
    pub medications: Option<String>,
    pub food_allergies: Option<String>,
    pub medication_allergies: Option<String>,
    pub blood_type: Option<BloodType>,
    pub has_blood_clot_history: bool,

    // Lifestyle and demographics
    pub age: Option<u32>,
    pub weight_category: Option<WeightCategory>,
    pub substance_use_history: Vec<SubstanceUse>,
    pub activity_level: Option<ActivityLevel>,
    pub has_exercise_restrictions: bool,
    pub exercise_restrictions_details: Option<String>,
    pub dietary_restrictions: Vec<DietaryRestriction>,
    pub work_physical_demand: Option<WorkPhysicalDemand>,
    pub work_chemical_exposure: bool,
    pub work_chemical_exposure_details: Option<String>,
    pub additional_notes: Option<String>,
}

/// Keys a client may never set directly.
const SERVER_OWNED_KEYS: &[&str] = &["id", "profile_completed", "created_at", "updated_at"];

impl ProfileData {
    /// Applies a partial update: top-level keys in `patch` replace the current
    /// values, `null` resets a field to its default, server-owned keys are ignored.
    pub fn merged(&self, patch: &Map<String, Value>) -> Result<ProfileData, serde_json::Error> {
        let mut current = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in patch {
            if SERVER_OWNED_KEYS.contains(&key.as_str()) {
                continue;
            }
            if value.is_null() {
                current.remove(key);
            } else {
                current.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(Value::Object(current))
    }

    pub fn is_multiple_pregnancy(&self) -> bool {
        self.pregnancy_type == Some(PregnancyType::Multiple)
    }
}

/// A stored profile. `profile_completed` is derived from `data` on every write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(flatten)]
    pub data: ProfileData,
    pub profile_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// The profile only counts once setup is complete; otherwise callers see nothing.
    pub fn completed(self) -> Option<Profile> {
        self.profile_completed.then_some(self)
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (browsers send `Date` objects).
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| serde::de::Error::custom(format!("invalid date '{raw}'")))
}
