//! Order normalization: raw orders joined against the menu lookup.

use crate::core::menu::MenuLookup;
use crate::domain::model::{MealCategory, NormalizeStats, Observation, RawRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde_json::Value;

pub const ITEMS_FIELD: &str = "items";
pub const DATETIME_FIELD: &str = "datetime";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Hour-only forms (`2024-01-15T08`); parsed with minutes appended.
const HOUR_ONLY_FORMATS: [&str; 2] = ["%Y-%m-%dT%H", "%Y-%m-%d %H"];

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
];

/// Parse an ISO-8601 timestamp into a timezone-naive UTC datetime.
///
/// Offset-aware input is converted to UTC and the zone dropped; naive input is taken
/// as-is. A bare date is midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.naive_utc());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    for format in HOUR_ONLY_FORMATS {
        let with_minutes = format!("{}:00", text);
        if let Ok(dt) = NaiveDateTime::parse_from_str(&with_minutes, &format!("{}:%M", format)) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Flatten orders into one observation per resolvable (order, item) pair.
pub fn normalize(orders: &[RawRecord], lookup: &MenuLookup) -> (Vec<Observation>, NormalizeStats) {
    let mut stats = NormalizeStats {
        orders_seen: orders.len(),
        ..NormalizeStats::default()
    };

    let mut observations = Vec::new();
    for order in orders {
        let timestamp = match order_timestamp(order) {
            Ok(ts) => ts,
            Err(reason) => {
                tracing::warn!("Skipping order ({}): {}", reason, order);
                stats.orders_skipped += 1;
                continue;
            }
        };
        let meal_category = MealCategory::from_hour(timestamp.hour());

        for item in order_items(order) {
            let Some(name) = item.as_str() else {
                tracing::warn!("Skipping invalid item (not a string): {}", item);
                stats.items_invalid += 1;
                continue;
            };
            let Some(entry) = lookup.get(name) else {
                tracing::warn!("Skipping item not found in menu: {}", name);
                stats.items_unmatched += 1;
                continue;
            };
            observations.push(Observation {
                item: name.to_string(),
                timestamp,
                cuisine: entry.cuisine.clone(),
                meal_category,
                selling_price: entry.pricing.map(|p| p.selling_price),
                profit_loss: entry.pricing.map(|p| p.profit_loss()),
            });
        }
    }

    stats.observations = observations.len();
    tracing::info!(
        "Normalized {} orders into {} observations ({} orders skipped, {} items unmatched, {} items invalid)",
        stats.orders_seen,
        stats.observations,
        stats.orders_skipped,
        stats.items_unmatched,
        stats.items_invalid
    );
    (observations, stats)
}

fn order_timestamp(order: &RawRecord) -> Result<NaiveDateTime, String> {
    let obj = order
        .as_object()
        .ok_or_else(|| "record is not an object".to_string())?;
    match obj.get(DATETIME_FIELD) {
        None | Some(Value::Null) => Err("missing datetime".to_string()),
        Some(Value::String(raw)) => {
            parse_timestamp(raw).ok_or_else(|| format!("invalid datetime format: {}", raw))
        }
        Some(_) => Err("datetime is not a string".to_string()),
    }
}

// 缺少 items 欄位視為空訂單
fn order_items(order: &RawRecord) -> &[Value] {
    match order.get(ITEMS_FIELD) {
        Some(Value::Array(items)) => items.as_slice(),
        Some(other) if !other.is_null() => {
            tracing::warn!("Ignoring order items that are not an array: {}", other);
            &[]
        }
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::menu::build_lookup;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn lookup() -> MenuLookup {
        build_lookup(&[
            json!({"name": "Dosa", "cuisine": "South Indian", "category": "Breakfast", "sellingPrice": 50, "actualPrice": 40}),
            json!({"name": "Thali", "cuisine": "North Indian", "category": "Lunch", "sellingPrice": 120, "actualPrice": 150}),
            json!({"name": "Idli", "cuisine": "South Indian", "category": "Breakfast"}),
        ])
        .0
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-01-15T08:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 08:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T08:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T08:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T13:30:00+05:30"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T08:00:00.123456").map(|d| d.hour()), Some(8));
        assert_eq!(
            parse_timestamp("2024-01-15").map(|d| d.hour()),
            Some(0)
        );
        assert_eq!(parse_timestamp("2024-01-15T08"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 08"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T8x"), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_timezone_aware_input_crosses_day_boundary() {
        let ts = parse_timestamp("2024-03-01T02:00:00+05:00").unwrap();
        assert_eq!(ts.to_string(), "2024-02-29 21:00:00");
    }

    #[test]
    fn test_invalid_datetime_contributes_nothing() {
        let orders = vec![
            json!({"items": ["Dosa"], "datetime": "not a date"}),
            json!({"items": ["Dosa"], "datetime": 1705305600}),
            json!({"items": ["Dosa"]}),
        ];
        let (obs, stats) = normalize(&orders, &lookup());
        assert!(obs.is_empty());
        assert_eq!(stats.orders_skipped, 3);
    }

    #[test]
    fn test_unmatched_item_does_not_drop_siblings() {
        let orders = vec![json!({"items": ["Ghost", "Dosa", 42, "Thali"], "datetime": "2024-01-15T12:00:00"})];
        let (obs, stats) = normalize(&orders, &lookup());
        let names: Vec<&str> = obs.iter().map(|o| o.item.as_str()).collect();
        assert_eq!(names, vec!["Dosa", "Thali"]);
        assert_eq!(stats.items_unmatched, 1);
        assert_eq!(stats.items_invalid, 1);
    }

    #[test]
    fn test_meal_category_comes_from_order_time() {
        let orders = vec![
            json!({"items": ["Thali"], "datetime": "2024-01-15T08:00:00"}),
            json!({"items": ["Dosa"], "datetime": "2024-01-15T22:00:00"}),
        ];
        let (obs, _) = normalize(&orders, &lookup());
        assert_eq!(obs[0].meal_category, MealCategory::Breakfast);
        assert_eq!(obs[1].meal_category, MealCategory::Other);
    }

    #[test]
    fn test_meal_category_boundaries() {
        assert_eq!(MealCategory::from_hour(5), MealCategory::Other);
        assert_eq!(MealCategory::from_hour(6), MealCategory::Breakfast);
        assert_eq!(MealCategory::from_hour(11), MealCategory::Lunch);
        assert_eq!(MealCategory::from_hour(15), MealCategory::Lunch);
        assert_eq!(MealCategory::from_hour(16), MealCategory::Dinner);
        assert_eq!(MealCategory::from_hour(21), MealCategory::Dinner);
        assert_eq!(MealCategory::from_hour(22), MealCategory::Other);
    }

    #[test]
    fn test_profit_loss_is_carried_when_priced() {
        let orders = vec![json!({"items": ["Dosa", "Thali", "Idli"], "datetime": "2024-01-15T12:00:00"})];
        let (obs, _) = normalize(&orders, &lookup());
        assert_eq!(obs[0].profit_loss, Some(Decimal::from(10)));
        assert_eq!(obs[1].profit_loss, Some(Decimal::from(-30)));
        assert_eq!(obs[2].profit_loss, None);
        assert_eq!(obs[2].selling_price, None);
    }
}
