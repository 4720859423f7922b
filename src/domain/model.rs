use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw document as returned by a record source (one menu item or one order).
pub type RawRecord = serde_json::Value;

/// Opaque handle to a rendered chart (relative file name, path or URL).
pub type ArtifactRef = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
    Other,
}

impl MealCategory {
    /// Half-open ranges: [6,11) Breakfast, [11,16) Lunch, [16,22) Dinner, else Other.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=10 => MealCategory::Breakfast,
            11..=15 => MealCategory::Lunch,
            16..=21 => MealCategory::Dinner,
            _ => MealCategory::Other,
        }
    }

    /// 菜單上的分類字串，無法辨識的一律歸為 Other
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "breakfast" => MealCategory::Breakfast,
            "lunch" => MealCategory::Lunch,
            "dinner" => MealCategory::Dinner,
            _ => MealCategory::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MealCategory::Breakfast => "Breakfast",
            MealCategory::Lunch => "Lunch",
            MealCategory::Dinner => "Dinner",
            MealCategory::Other => "Other",
        }
    }
}

impl fmt::Display for MealCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selling and cost price of a menu item. Legacy menu documents carry neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub selling_price: Decimal,
    pub actual_price: Decimal,
}

impl Pricing {
    pub fn profit_loss(&self) -> Decimal {
        self.selling_price - self.actual_price
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub name: String,
    pub category: MealCategory,
    pub cuisine: String,
    pub pricing: Option<Pricing>,
}

/// One resolved (order, item) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub item: String,
    /// Timezone-naive, UTC-normalized order time.
    pub timestamp: NaiveDateTime,
    pub cuisine: String,
    pub meal_category: MealCategory,
    pub selling_price: Option<Decimal>,
    pub profit_loss: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measure {
    Count(u64),
    Amount(Decimal),
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Count(n) => write!(f, "{}", n),
            Measure::Amount(d) => write!(f, "{}", d),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: Measure,
}

impl SeriesPoint {
    pub fn count(label: impl Into<String>, value: u64) -> Self {
        Self {
            label: label.into(),
            value: Measure::Count(value),
        }
    }

    pub fn amount(label: impl Into<String>, value: Decimal) -> Self {
        Self {
            label: label.into(),
            value: Measure::Amount(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedAggregate {
    pub name: String,
    pub title: String,
    pub kind: ChartKind,
    pub series: Vec<SeriesPoint>,
}

impl NamedAggregate {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Value for a label, if the label exists in the series.
    pub fn value_of(&self, label: &str) -> Option<Measure> {
        self.series
            .iter()
            .find(|p| p.label == label)
            .map(|p| p.value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MenuStats {
    pub records_seen: usize,
    pub entries: usize,
    pub skipped: usize,
    /// Records whose name was already present (the later record replaced it).
    pub duplicates: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    pub orders_seen: usize,
    pub orders_skipped: usize,
    pub observations: usize,
    pub items_invalid: usize,
    pub items_unmatched: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderFailure {
    pub aggregate: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssembledReport {
    pub artifacts: Vec<ArtifactRef>,
    pub failures: Vec<RenderFailure>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportOutcome {
    pub artifacts: Vec<ArtifactRef>,
    pub failures: Vec<RenderFailure>,
    pub menu_stats: MenuStats,
    pub normalize_stats: NormalizeStats,
    pub aggregates_computed: usize,
    pub bundle: Option<String>,
}

impl ReportOutcome {
    /// "No data yet": nothing could be produced, which is not a fault.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}
