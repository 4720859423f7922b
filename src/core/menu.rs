//! Menu lookup: raw menu documents to a name → [`MenuEntry`] mapping.

use crate::domain::model::{MealCategory, MenuEntry, MenuStats, Pricing, RawRecord};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

pub const SELLING_PRICE_FIELD: &str = "sellingPrice";
pub const ACTUAL_PRICE_FIELD: &str = "actualPrice";

/// Upper bound for a single menu price.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

#[derive(Debug, Clone, Default)]
pub struct MenuLookup {
    entries: HashMap<String, MenuEntry>,
}

impl MenuLookup {
    pub fn get(&self, name: &str) -> Option<&MenuEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the lookup. Malformed records are skipped with a warning; for a repeated
/// name the later record wins.
pub fn build_lookup(records: &[RawRecord]) -> (MenuLookup, MenuStats) {
    let mut entries: HashMap<String, MenuEntry> = HashMap::new();
    let mut stats = MenuStats {
        records_seen: records.len(),
        ..MenuStats::default()
    };

    for record in records {
        match parse_entry(record) {
            Ok(entry) => {
                if entries.insert(entry.name.clone(), entry).is_some() {
                    stats.duplicates += 1;
                }
            }
            Err(reason) => {
                tracing::warn!("Skipping menu item ({}): {}", reason, record);
                stats.skipped += 1;
            }
        }
    }

    stats.entries = entries.len();
    tracing::info!(
        "Created menu lookup with {} items ({} skipped, {} replaced)",
        stats.entries,
        stats.skipped,
        stats.duplicates
    );
    (MenuLookup { entries }, stats)
}

fn parse_entry(record: &RawRecord) -> Result<MenuEntry, String> {
    let obj = record
        .as_object()
        .ok_or_else(|| "record is not an object".to_string())?;

    let name = required_str(obj, "name")?;
    if name.trim().is_empty() {
        return Err("empty name".to_string());
    }
    let cuisine = required_str(obj, "cuisine")?;
    let category = required_str(obj, "category")?;

    Ok(MenuEntry {
        name: name.to_string(),
        category: MealCategory::from_label(category),
        cuisine: cuisine.to_string(),
        pricing: parse_pricing(obj)?,
    })
}

fn required_str<'a>(obj: &'a serde_json::Map<String, Value>, field: &str) -> Result<&'a str, String> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(format!("missing {}", field)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(format!("{} is not a string", field)),
    }
}

// 舊版菜單文件沒有價格欄位：保留項目，但不參與損益統計
fn parse_pricing(obj: &serde_json::Map<String, Value>) -> Result<Option<Pricing>, String> {
    let selling = obj.get(SELLING_PRICE_FIELD).filter(|v| !v.is_null());
    let actual = obj.get(ACTUAL_PRICE_FIELD).filter(|v| !v.is_null());

    match (selling, actual) {
        (None, None) => Ok(None),
        (Some(selling), Some(actual)) => Ok(Some(Pricing {
            selling_price: parse_price(SELLING_PRICE_FIELD, selling)?,
            actual_price: parse_price(ACTUAL_PRICE_FIELD, actual)?,
        })),
        (Some(_), None) => Err(format!("missing {}", ACTUAL_PRICE_FIELD)),
        (None, Some(_)) => Err(format!("missing {}", SELLING_PRICE_FIELD)),
    }
}

/// Coerce a number or numeric string into a non-negative decimal.
pub fn parse_price(field: &str, value: &Value) -> Result<Decimal, String> {
    let parsed = match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
    .ok_or_else(|| format!("{} is not a number: {}", field, value))?;

    if parsed.is_sign_negative() && !parsed.is_zero() {
        return Err(format!("{} is negative: {}", field, parsed));
    }
    if parsed > MAX_PRICE {
        return Err(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field, MAX_PRICE, parsed
        ));
    }
    Ok(parsed)
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}
