use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// How a form value is coerced before it goes on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WireType {
    Int,
    Float,
    Text,
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::Int => write!(f, "an integer"),
            WireType::Float => write!(f, "a number"),
            WireType::Text => write!(f, "text"),
        }
    }
}

/// One entry of a selection list
#[derive(Debug, Clone, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A form field, its wire name and the closed list of values it accepts
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub wire_name: &'static str,
    pub wire_type: WireType,
    pub choices: Vec<Choice>,
}

impl FieldSpec {
    fn new(
        name: &'static str,
        label: &'static str,
        wire_name: &'static str,
        wire_type: WireType,
        choices: Vec<Choice>,
    ) -> Self {
        Self {
            name,
            label,
            wire_name,
            wire_type,
            choices,
        }
    }

    pub fn accepts(&self, value: &str) -> bool {
        self.choices.iter().any(|c| c.value == value)
    }

    /// Closest offered value, if any is reasonably similar.
    pub fn suggest(&self, value: &str) -> Option<&str> {
        let needle = value.to_lowercase();
        self.choices
            .iter()
            .map(|c| {
                let score = strsim::jaro_winkler(&needle, &c.value.to_lowercase())
                    .max(strsim::jaro_winkler(&needle, &c.label.to_lowercase()));
                (c.value.as_str(), score)
            })
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(value, _)| value)
    }
}

const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Text the prediction service uses for each outcome
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OutcomeLabels {
    pub delay: &'static str,
    pub no_delay: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Failures are reported to the user.
    Disabled,
    /// Failures are masked by the local heuristic. Demo mode only: the
    /// result is not a live inference.
    Heuristic,
}

/// Configuration of one flavour of the prediction form
#[derive(Debug, Clone, Serialize)]
pub struct FormVariant {
    pub name: &'static str,
    pub title: &'static str,
    pub fields: Vec<FieldSpec>,
    /// Wire fields sent with a fixed value
    pub constants: Vec<(&'static str, i64)>,
    pub endpoint: String,
    pub discriminant: &'static str,
    pub labels: OutcomeLabels,
    pub fallback: FallbackPolicy,
}

impl FormVariant {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Variant summary for listings
#[derive(Debug, Serialize)]
pub struct VariantSummary {
    pub name: &'static str,
    pub title: &'static str,
    pub fields: Vec<&'static str>,
    pub endpoint: String,
    pub fallback: FallbackPolicy,
}

/// The set of forms this service offers
#[derive(Debug)]
pub struct Catalog {
    variants: Vec<Arc<FormVariant>>,
}

impl Catalog {
    /// Build the three variants against the given service base urls.
    pub fn new(render_base_url: &str, local_base_url: &str) -> Self {
        let render = render_base_url.trim_end_matches('/');
        let local = local_base_url.trim_end_matches('/');

        Self {
            variants: vec![
                Arc::new(render_cloud(format!("{render}/predict/"))),
                Arc::new(local_model(
                    "local",
                    "Flight Delay Predictor",
                    format!("{local}/predict"),
                    FallbackPolicy::Disabled,
                )),
                Arc::new(local_model(
                    "local-demo",
                    "Flight Delay Predictor (demo)",
                    format!("{local}/predict"),
                    FallbackPolicy::Heuristic,
                )),
            ],
        }
    }

    pub fn find(&self, name: &str) -> Option<Arc<FormVariant>> {
        self.variants.iter().find(|v| v.name == name).cloned()
    }

    pub fn summaries(&self) -> Vec<VariantSummary> {
        self.variants
            .iter()
            .map(|v| VariantSummary {
                name: v.name,
                title: v.title,
                fields: v.fields.iter().map(|f| f.name).collect(),
                endpoint: v.endpoint.clone(),
                fallback: v.fallback,
            })
            .collect()
    }
}

fn render_cloud(endpoint: String) -> FormVariant {
    FormVariant {
        name: "render-cloud",
        title: "Flight Delay Predictor AI",
        fields: vec![
            FieldSpec::new("dayOfWeek", "Day of Week", "DayOfWeek", WireType::Int, days_of_week()),
            FieldSpec::new("day", "Day of Month (March)", "Day", WireType::Int, days_of_month()),
            FieldSpec::new("origin", "Origin Airport", "Origin", WireType::Text, airports()),
            FieldSpec::new("dest", "Destination Airport", "Dest", WireType::Text, airports()),
            FieldSpec::new(
                "depDelay",
                "Departure Delay (minutes)",
                "DepDelay",
                WireType::Float,
                departure_delays(),
            ),
        ],
        constants: vec![("Month", 3)],
        endpoint,
        discriminant: "predicted_delay",
        labels: OutcomeLabels {
            delay: "Delay",
            no_delay: "No Delay",
        },
        fallback: FallbackPolicy::Disabled,
    }
}

fn local_model(
    name: &'static str,
    title: &'static str,
    endpoint: String,
    fallback: FallbackPolicy,
) -> FormVariant {
    FormVariant {
        name,
        title,
        fields: vec![
            FieldSpec::new(
                "dayOfMonth",
                "Day of Month",
                "DayofMonth",
                WireType::Int,
                days_of_month(),
            ),
            FieldSpec::new("airline", "Airline", "Operating_Airline", WireType::Text, airlines()),
            FieldSpec::new(
                "tailNumber",
                "Tail Number",
                "Tail_Number",
                WireType::Text,
                tail_numbers(),
            ),
            FieldSpec::new("origin", "Origin Airport", "Origin", WireType::Text, airports()),
            FieldSpec::new("dest", "Destination Airport", "Dest", WireType::Text, airports()),
            FieldSpec::new("depHour", "Departure Hour", "DepHour", WireType::Int, hours()),
            FieldSpec::new("isWeekend", "Weekend", "IsWeekend", WireType::Int, weekend_flags()),
        ],
        constants: Vec::new(),
        endpoint,
        discriminant: "prediction",
        labels: OutcomeLabels {
            delay: "Delayed",
            no_delay: "On Time",
        },
        fallback,
    }
}

// Option tables

const AIRPORTS: [(&str, &str); 10] = [
    ("ATL", "Atlanta Hartsfield-Jackson"),
    ("XNA", "Northwest Arkansas Regional"),
    ("DFW", "Dallas/Fort Worth"),
    ("ORD", "Chicago O'Hare"),
    ("LAX", "Los Angeles"),
    ("DEN", "Denver International"),
    ("SEA", "Seattle-Tacoma"),
    ("PHX", "Phoenix Sky Harbor"),
    ("CLT", "Charlotte Douglas"),
    ("LAS", "Las Vegas McCarran"),
];

const AIRLINES: [(&str, &str); 8] = [
    ("AA", "American Airlines"),
    ("DL", "Delta Air Lines"),
    ("UA", "United Airlines"),
    ("WN", "Southwest Airlines"),
    ("B6", "JetBlue Airways"),
    ("AS", "Alaska Airlines"),
    ("NK", "Spirit Airlines"),
    ("F9", "Frontier Airlines"),
];

const TAIL_NUMBERS: [&str; 10] = [
    "N101AA", "N202DL", "N303UA", "N404WN", "N505JB", "N606AS", "N707NK", "N808FR", "N909AA",
    "N110DL",
];

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const DEPARTURE_DELAYS: [(i32, &str); 9] = [
    (-10, "-10 (Early)"),
    (-5, "-5 (Early)"),
    (0, "0 (On Time)"),
    (5, "5 minutes"),
    (10, "10 minutes"),
    (15, "15 minutes"),
    (30, "30 minutes"),
    (45, "45 minutes"),
    (60, "60 minutes"),
];

fn airports() -> Vec<Choice> {
    AIRPORTS
        .iter()
        .map(|(code, name)| Choice::new(*code, *name))
        .collect()
}

fn airlines() -> Vec<Choice> {
    AIRLINES
        .iter()
        .map(|(code, name)| Choice::new(*code, *name))
        .collect()
}

fn tail_numbers() -> Vec<Choice> {
    TAIL_NUMBERS.iter().map(|t| Choice::new(*t, *t)).collect()
}

/// 1 = Sunday .. 7 = Saturday
fn days_of_week() -> Vec<Choice> {
    WEEKDAYS
        .iter()
        .enumerate()
        .map(|(i, day)| Choice::new((i + 1).to_string(), *day))
        .collect()
}

fn days_of_month() -> Vec<Choice> {
    (1..=31)
        .map(|d| Choice::new(d.to_string(), d.to_string()))
        .collect()
}

fn hours() -> Vec<Choice> {
    (0..=23)
        .map(|h| Choice::new(h.to_string(), format!("{h:02}:00")))
        .collect()
}

fn departure_delays() -> Vec<Choice> {
    DEPARTURE_DELAYS
        .iter()
        .map(|(minutes, label)| Choice::new(minutes.to_string(), *label))
        .collect()
}

fn weekend_flags() -> Vec<Choice> {
    vec![Choice::new("0", "Weekday"), Choice::new("1", "Weekend")]
}
