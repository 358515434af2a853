//! Forgiving parsing of the model's item list.

use serde_json::Value;

use stowaway_core::DetectedItem;

/// Turn raw model text into detections. Strips markdown fences, wraps a bare
/// object into a one-element list, and drops entries without a name.
/// Anything unusable yields an empty list, never an error.
pub(crate) fn parse_detections(raw: &str) -> Vec<DetectedItem> {
    let clean = strip_fences(raw);
    let value: Value = match serde_json::from_str(&clean) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(%err, "unparsable model reply");
            return Vec::new();
        }
    };
    let entries = match value {
        Value::Array(entries) => entries,
        object @ Value::Object(_) => vec![object],
        _ => return Vec::new(),
    };
    entries.iter().filter_map(detection_from).collect()
}

fn strip_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

fn detection_from(entry: &Value) -> Option<DetectedItem> {
    let name = entry.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }
    let category = entry
        .get("category")
        .and_then(Value::as_str)
        .filter(|c| !c.trim().is_empty())
        .unwrap_or("General");
    Some(DetectedItem {
        name: name.to_string(),
        category: category.to_string(),
        quantity: quantity_from(entry.get("quantity")),
    })
}

/// Models return quantities as numbers, floats, or quoted strings.
fn quantity_from(value: Option<&Value>) -> u32 {
    let quantity = match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(1),
        Some(Value::String(s)) => s.trim().parse::<u64>().unwrap_or(1),
        _ => 1,
    };
    quantity.clamp(1, u32::MAX as u64) as u32
}
