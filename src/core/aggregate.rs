//! Aggregation engine: observations to the fixed, ordered set of named aggregates.
//!
//! All observations are folded once into [`Tallies`]; every aggregate is then a pure
//! read of those tables. The presentation order is the order of [`AGGREGATES`].

use crate::domain::model::{ChartKind, NamedAggregate, Observation, SeriesPoint};
use chrono::{Datelike, Timelike};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::{BTreeMap, HashMap};

pub const TOP_ITEMS_LIMIT: usize = 10;
pub const PROFIT_RANKING_LIMIT: usize = 5;
pub const MONEY_DECIMAL_PLACES: u32 = 2;

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// One entry of the aggregate table.
pub struct AggregateDef {
    pub name: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
    compute: fn(&Tallies) -> Vec<SeriesPoint>,
}

pub const AGGREGATES: [AggregateDef; 10] = [
    AggregateDef {
        name: "cuisine_pie",
        title: "Distribution of Orders by Cuisine",
        kind: ChartKind::Pie,
        compute: cuisine_pie,
    },
    AggregateDef {
        name: "category_pie",
        title: "Distribution of Orders by Meal Time",
        kind: ChartKind::Pie,
        compute: category_pie,
    },
    AggregateDef {
        name: "monthly_sales",
        title: "Monthly Sales (Number of Orders)",
        kind: ChartKind::Bar,
        compute: monthly_sales,
    },
    AggregateDef {
        name: "top_items",
        title: "Top 10 Most Ordered Items",
        kind: ChartKind::Bar,
        compute: top_items,
    },
    AggregateDef {
        name: "peak_hours",
        title: "Orders by Hour of Day (Peak Hours)",
        kind: ChartKind::Bar,
        compute: peak_hours,
    },
    AggregateDef {
        name: "weekday_sales",
        title: "Orders by Day of Week",
        kind: ChartKind::Bar,
        compute: weekday_sales,
    },
    AggregateDef {
        name: "profit_loss_by_item",
        title: "Profit / Loss by Item",
        kind: ChartKind::Bar,
        compute: profit_loss_by_item,
    },
    AggregateDef {
        name: "most_profitable_items",
        title: "Top 5 Most Profitable Items",
        kind: ChartKind::Bar,
        compute: most_profitable_items,
    },
    AggregateDef {
        name: "loss_by_item",
        title: "Top 5 Loss-Making Items",
        kind: ChartKind::Bar,
        compute: loss_by_item,
    },
    AggregateDef {
        name: "profit_loss_over_time",
        title: "Monthly Profit / Loss",
        kind: ChartKind::Line,
        compute: profit_loss_over_time,
    },
];

/// Names of every aggregate the engine can produce, in presentation order.
pub fn aggregate_names() -> impl Iterator<Item = &'static str> {
    AGGREGATES.iter().map(|def| def.name)
}

/// Keyed totals in first-seen key order.
#[derive(Debug, Clone)]
struct Tally<V> {
    index: HashMap<String, usize>,
    entries: Vec<(String, V)>,
}

impl<V> Default for Tally<V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

/// Addition that reports overflow instead of panicking.
trait CheckedSum: Copy {
    fn checked_sum(self, other: Self) -> Option<Self>;
}

impl CheckedSum for u64 {
    fn checked_sum(self, other: Self) -> Option<Self> {
        self.checked_add(other)
    }
}

impl CheckedSum for Decimal {
    fn checked_sum(self, other: Self) -> Option<Self> {
        self.checked_add(other)
    }
}

impl<V: CheckedSum> Tally<V> {
    /// On overflow the previous total is kept and the addend is dropped.
    fn add(mut self, key: &str, amount: V) -> Self {
        match self.index.get(key) {
            Some(&i) => match self.entries[i].1.checked_sum(amount) {
                Some(total) => self.entries[i].1 = total,
                None => tracing::warn!("Total for {} overflowed, dropping one observation", key),
            },
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), amount));
            }
        }
        self
    }
}

impl<V: Copy + Ord> Tally<V> {
    /// Descending by value; equal values keep first-seen order.
    fn ranked_desc(&self) -> Vec<(&str, V)> {
        let mut ranked: Vec<(&str, V)> = self.entries.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

type MonthKey = (i32, u32);

#[derive(Debug, Clone, Default)]
pub struct Tallies {
    cuisine: Tally<u64>,
    meal_category: Tally<u64>,
    items: Tally<u64>,
    months: BTreeMap<MonthKey, u64>,
    hours: [u64; 24],
    weekdays: [u64; 7],
    item_profit: Tally<Decimal>,
    month_profit: BTreeMap<MonthKey, Decimal>,
}

impl Tallies {
    pub fn from_observations(observations: &[Observation]) -> Self {
        observations.iter().fold(Tallies::default(), Tallies::absorb)
    }

    fn absorb(self, obs: &Observation) -> Self {
        let month = (obs.timestamp.year(), obs.timestamp.month());
        let mut hours = self.hours;
        hours[obs.timestamp.hour() as usize] += 1;
        let mut weekdays = self.weekdays;
        weekdays[obs.timestamp.weekday().num_days_from_monday() as usize] += 1;
        let mut months = self.months;
        *months.entry(month).or_insert(0) += 1;

        let (item_profit, month_profit) = match obs.profit_loss {
            Some(pl) => {
                let mut month_profit = self.month_profit;
                let total = month_profit.entry(month).or_insert(Decimal::ZERO);
                match total.checked_add(pl) {
                    Some(sum) => *total = sum,
                    None => tracing::warn!(
                        "Profit/loss for {} overflowed, dropping one observation",
                        month_label(month)
                    ),
                }
                (self.item_profit.add(&obs.item, pl), month_profit)
            }
            None => (self.item_profit, self.month_profit),
        };

        Tallies {
            cuisine: self.cuisine.add(&obs.cuisine, 1),
            meal_category: self.meal_category.add(obs.meal_category.as_str(), 1),
            items: self.items.add(&obs.item, 1),
            months,
            hours,
            weekdays,
            item_profit,
            month_profit,
        }
    }
}

/// Compute every non-empty aggregate, in table order.
pub fn aggregate(observations: &[Observation]) -> Vec<NamedAggregate> {
    if observations.is_empty() {
        tracing::info!("No valid order data to aggregate");
        return Vec::new();
    }

    let tallies = Tallies::from_observations(observations);
    AGGREGATES
        .iter()
        .filter_map(|def| {
            let series = (def.compute)(&tallies);
            if series.is_empty() {
                tracing::debug!("Aggregate {} has no data, skipping", def.name);
                return None;
            }
            Some(NamedAggregate {
                name: def.name.to_string(),
                title: def.title.to_string(),
                kind: def.kind,
                series,
            })
        })
        .collect()
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

fn month_label((year, month): MonthKey) -> String {
    format!("{:04}-{:02}", year, month)
}

fn cuisine_pie(t: &Tallies) -> Vec<SeriesPoint> {
    t.cuisine
        .ranked_desc()
        .into_iter()
        .map(|(k, n)| SeriesPoint::count(k, n))
        .collect()
}

fn category_pie(t: &Tallies) -> Vec<SeriesPoint> {
    t.meal_category
        .ranked_desc()
        .into_iter()
        .map(|(k, n)| SeriesPoint::count(k, n))
        .collect()
}

fn monthly_sales(t: &Tallies) -> Vec<SeriesPoint> {
    t.months
        .iter()
        .map(|(&m, &n)| SeriesPoint::count(month_label(m), n))
        .collect()
}

fn top_items(t: &Tallies) -> Vec<SeriesPoint> {
    t.items
        .ranked_desc()
        .into_iter()
        .take(TOP_ITEMS_LIMIT)
        .map(|(k, n)| SeriesPoint::count(k, n))
        .collect()
}

fn peak_hours(t: &Tallies) -> Vec<SeriesPoint> {
    t.hours
        .iter()
        .enumerate()
        .map(|(hour, &n)| SeriesPoint::count(hour.to_string(), n))
        .collect()
}

fn weekday_sales(t: &Tallies) -> Vec<SeriesPoint> {
    WEEKDAYS
        .iter()
        .zip(t.weekdays.iter())
        .map(|(day, &n)| SeriesPoint::count(*day, n))
        .collect()
}

fn profit_loss_by_item(t: &Tallies) -> Vec<SeriesPoint> {
    t.item_profit
        .entries
        .iter()
        .map(|(k, v)| SeriesPoint::amount(k.as_str(), round_money(*v)))
        .collect()
}

fn most_profitable_items(t: &Tallies) -> Vec<SeriesPoint> {
    t.item_profit
        .ranked_desc()
        .into_iter()
        .filter(|(_, v)| v.is_sign_positive() && !v.is_zero())
        .take(PROFIT_RANKING_LIMIT)
        .map(|(k, v)| SeriesPoint::amount(k, round_money(v)))
        .collect()
}

fn loss_by_item(t: &Tallies) -> Vec<SeriesPoint> {
    let mut losses: Vec<(&str, Decimal)> = t
        .item_profit
        .entries
        .iter()
        .filter(|(_, v)| v.is_sign_negative() && !v.is_zero())
        .map(|(k, v)| (k.as_str(), *v))
        .collect();
    losses.sort_by(|a, b| a.1.cmp(&b.1));
    losses
        .into_iter()
        .take(PROFIT_RANKING_LIMIT)
        .map(|(k, v)| SeriesPoint::amount(k, round_money(v)))
        .collect()
}

// 每月損益完全相同時沒有資訊量，不輸出
fn profit_loss_over_time(t: &Tallies) -> Vec<SeriesPoint> {
    let series: Vec<SeriesPoint> = t
        .month_profit
        .iter()
        .map(|(&m, &v)| SeriesPoint::amount(month_label(m), round_money(v)))
        .collect();
    let Some(first) = series.first() else {
        return Vec::new();
    };
    if series.iter().all(|p| p.value == first.value) {
        return Vec::new();
    }
    series
}
