use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Placeholder used when a detail's customer has no registry entry.
pub const NAME_UNAVAILABLE: &str = "Nombre no disponible";
/// Placeholder used when a detail's customer has no segmentation entry.
pub const NO_SEGMENT: &str = "Sin segmento";

// ============ Upstream Models ============

/// Join key derived from an upstream `cliente_id` value.
///
/// Keys compare by JSON identity, so `1` and `"1"` are distinct customers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomerKey(String);

impl CustomerKey {
    /// Builds a key from a raw id, rejecting ids that count as missing
    /// (`null` or an empty string).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            other => Some(Self(other.to_string())),
        }
    }
}

impl fmt::Display for CustomerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Segment assignment from the segmentation upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerSegment {
    pub customer_id: CustomerKey,
    pub segment: Value,
}

/// Registry entry from the customer upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub customer_id: CustomerKey,
    pub full_name: Value,
}

/// One purchase-detail entry, with defaults already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseDetail {
    /// Key used for the lookups.
    pub key: CustomerKey,
    /// Id exactly as the upstream sent it.
    pub customer_id: Value,
    pub purchase_count: Value,
    pub purchase_cost: Value,
    pub last_purchase: Value,
}

/// Why an upstream entry was left out of the join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The entry is not a JSON object.
    NotAnObject,
    /// No usable `cliente_id`.
    MissingCustomerId,
    /// The looked-up value (segment or name) is absent or null.
    MissingField(&'static str),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotAnObject => write!(f, "entry is not an object"),
            SkipReason::MissingCustomerId => write!(f, "missing customer id"),
            SkipReason::MissingField(field) => write!(f, "missing field '{}'", field),
        }
    }
}

// ============ API Response Models ============

/// One consolidated customer row as served by `/api/clientes/consolidado`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedRecord {
    #[serde(rename = "idcliente")]
    pub customer_id: Value,
    #[serde(rename = "nombre")]
    pub name: Value,
    #[serde(rename = "segmento")]
    pub segment: Value,
    #[serde(rename = "cantidadcompra")]
    pub purchase_count: Value,
    #[serde(rename = "costo")]
    pub purchase_cost: Value,
    pub ultima_compra: Value,
}

/// Per-request counters of the join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidationStats {
    /// Detail entries turned into records.
    pub processed: usize,
    /// Detail entries skipped as malformed.
    pub skipped: usize,
}

/// Result of a successful consolidation.
#[derive(Debug, Clone, PartialEq)]
pub struct Consolidation {
    pub records: Vec<ConsolidatedRecord>,
    pub stats: ConsolidationStats,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub current_time: String,
    pub uptime_since: String,
    pub checks_count: u64,
}

/// Snapshot of the process-wide health counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthInfo {
    pub last_health_check: Option<String>,
    pub uptime_start: String,
    pub health_checks_count: u64,
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub service: String,
    pub status: String,
    pub current_time: String,
    pub health_info: HealthInfo,
    pub available_endpoints: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_customer_key_distinguishes_number_and_string() {
        let numeric = CustomerKey::from_value(&json!(1)).unwrap();
        let text = CustomerKey::from_value(&json!("1")).unwrap();
        assert_ne!(numeric, text);
    }

    #[test]
    fn test_customer_key_rejects_null_and_empty() {
        assert!(CustomerKey::from_value(&Value::Null).is_none());
        assert!(CustomerKey::from_value(&json!("")).is_none());
        assert!(CustomerKey::from_value(&json!(0)).is_some());
    }

    #[test]
    fn test_consolidated_record_wire_names() {
        let record = ConsolidatedRecord {
            customer_id: json!(1),
            name: json!("Ana"),
            segment: json!("gold"),
            purchase_count: json!(3),
            purchase_cost: json!(150),
            ultima_compra: json!("2024-01-01"),
        };

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "idcliente": 1,
                "nombre": "Ana",
                "segmento": "gold",
                "cantidadcompra": 3,
                "costo": 150,
                "ultima_compra": "2024-01-01"
            })
        );
    }
}
