use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of cycle tabs. The lowercase name doubles as the API
/// path segment and the DOM panel prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleType {
    Daily,
    Yearly,
    Business,
    Soul,
    Human,
    Health,
    Reincarnation,
}

impl CycleType {
    pub const ALL: [CycleType; 7] = [
        CycleType::Human,
        CycleType::Daily,
        CycleType::Yearly,
        CycleType::Business,
        CycleType::Soul,
        CycleType::Health,
        CycleType::Reincarnation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CycleType::Daily => "daily",
            CycleType::Yearly => "yearly",
            CycleType::Business => "business",
            CycleType::Soul => "soul",
            CycleType::Human => "human",
            CycleType::Health => "health",
            CycleType::Reincarnation => "reincarnation",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CycleType::Daily => "Daily",
            CycleType::Yearly => "Yearly",
            CycleType::Business => "Business",
            CycleType::Soul => "Soul",
            CycleType::Human => "Human Life",
            CycleType::Health => "Health",
            CycleType::Reincarnation => "Reincarnation",
        }
    }

    /// Cycles anchored to the user's birth date cannot be computed
    /// without one.
    pub fn requires_birth_date(self) -> bool {
        matches!(
            self,
            CycleType::Yearly | CycleType::Human | CycleType::Health | CycleType::Reincarnation
        )
    }
}

impl fmt::Display for CycleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CycleType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(CycleType::Daily),
            "yearly" => Ok(CycleType::Yearly),
            "business" => Ok(CycleType::Business),
            "soul" => Ok(CycleType::Soul),
            "human" => Ok(CycleType::Human),
            "health" => Ok(CycleType::Health),
            "reincarnation" => Ok(CycleType::Reincarnation),
            _ => Err(()),
        }
    }
}

/// One named sub-interval of a cycle. Which of the optional bounds are
/// set depends on the cycle type: daily periods carry times of day,
/// yearly/business/soul/health periods carry calendar dates, human and
/// reincarnation periods carry age brackets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Period {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub principle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_description: Option<String>,
}

/// Static per-period reference material, flattened for client use.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CycleTemplate {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_age: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRef {
    pub id: u64,
    pub name: String,
}

/// One business's cycle record inside a `business_cycles` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessCycle {
    pub business: BusinessRef,
    #[serde(default)]
    pub periods: Vec<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_period: Option<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<CycleTemplate>,
}

/// Flat single-cycle record returned for every non-business cycle type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlatCycle {
    #[serde(default)]
    pub periods: Vec<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_period: Option<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_period_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<CycleTemplate>,
}

/// The two raw shapes the cycle API speaks. Presence of the
/// `business_cycles` key selects the list variant, so that variant is
/// tried first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CycleResponse {
    BusinessList { business_cycles: Vec<BusinessCycle> },
    Flat(FlatCycle),
}

/// The single canonical shape every renderer consumes.
///
/// Invariants: `progress` is finite, clamped to `[0, 100]` and rounded
/// to one decimal place; `period_name` is empty rather than absent when
/// it cannot be resolved; `current_period_number` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedView {
    pub progress: f64,
    pub period_name: String,
    pub periods: Vec<Period>,
    pub current_period: Period,
    pub current_period_number: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<CycleTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_label: Option<String>,
}

/// Normalized view plus the pre-rendered fragments the page script
/// swaps in on a tab switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleViewResponse {
    pub view: NormalizedView,
    pub ring_html: String,
    pub cards_html: String,
    pub summary_html: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub business_start_date: Option<NaiveDate>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub id: u64,
    pub name: String,
    pub establishment_date: NaiveDate,
}

/// Everything persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppData {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub businesses: Vec<Business>,
    #[serde(default = "first_id")]
    pub next_business_id: u64,
}

fn first_id() -> u64 {
    1
}

impl Default for AppData {
    fn default() -> Self {
        Self {
            profile: Profile {
                timezone: default_timezone(),
                ..Profile::default()
            },
            businesses: Vec::new(),
            next_business_id: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BusinessForm {
    pub name: String,
    pub establishment_date: String,
}
