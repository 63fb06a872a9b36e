//! Joins segmentation, customer registry and purchase-detail payloads into
//! one list of per-customer records.
//!
//! The upstreams do not agree on a response envelope: some return a bare list,
//! some wrap it under a key, and a misbehaving one may hand back an error page
//! as a JSON string. [`UpstreamPayload`] captures those shapes and
//! [`normalize`] turns them into a list of entries (or a format error), so the
//! join itself only ever sees lists.

use crate::errors::AppError;
use crate::models::{
    ConsolidatedRecord, Consolidation, ConsolidationStats, Customer, CustomerKey, CustomerSegment,
    PurchaseDetail, SkipReason, NAME_UNAVAILABLE, NO_SEGMENT,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;

const CUSTOMER_ID_KEYS: &[&str] = &["cliente_id", "customer_id"];
const SEGMENT_KEYS: &[&str] = &["segmento", "segment"];
const FULL_NAME_KEYS: &[&str] = &["fullname", "full_name"];
const PURCHASE_COUNT_KEY: &str = "cantidad_de_compras";
const PURCHASE_COST_KEY: &str = "costo_de_compras";
const LAST_PURCHASE_KEY: &str = "ultima_compra";

/// The upstream a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamSource {
    Segments,
    Customers,
    DetailsPage1,
    DetailsPage2,
}

impl UpstreamSource {
    /// Key the upstream normally wraps its list under.
    pub fn envelope_key(self) -> &'static str {
        match self {
            UpstreamSource::Segments | UpstreamSource::Customers => "clientes",
            UpstreamSource::DetailsPage1 | UpstreamSource::DetailsPage2 => "clientes_info",
        }
    }
}

impl fmt::Display for UpstreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UpstreamSource::Segments => "segmentation",
            UpstreamSource::Customers => "customer registry",
            UpstreamSource::DetailsPage1 => "purchase details page 1",
            UpstreamSource::DetailsPage2 => "purchase details page 2",
        };
        f.write_str(label)
    }
}

/// Shape of a parsed upstream body.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamPayload {
    /// A list of entries, used as is.
    List(Vec<Value>),
    /// An object expected to wrap the real list under some key.
    Envelope(Map<String, Value>),
    /// A bare JSON string, usually an error page served as JSON.
    Text(String),
    /// Any other scalar (number, bool, null).
    Scalar(Value),
}

impl From<Value> for UpstreamPayload {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => UpstreamPayload::List(items),
            Value::Object(map) => UpstreamPayload::Envelope(map),
            Value::String(text) => UpstreamPayload::Text(text),
            other => UpstreamPayload::Scalar(other),
        }
    }
}

impl UpstreamPayload {
    /// Extracts the entry list.
    ///
    /// For envelopes the source's usual key wins when it holds a list;
    /// otherwise the first list-valued key in document order is taken.
    pub fn into_entries(self, source: UpstreamSource) -> Result<Vec<Value>, AppError> {
        match self {
            UpstreamPayload::List(items) => {
                tracing::debug!("{} payload is a list of {} entries", source, items.len());
                Ok(items)
            }
            UpstreamPayload::Envelope(mut map) => {
                let preferred = source.envelope_key();
                let key = if map.get(preferred).is_some_and(Value::is_array) {
                    Some(preferred.to_string())
                } else {
                    map.iter()
                        .find(|(_, value)| value.is_array())
                        .map(|(key, _)| key.clone())
                };

                match key.and_then(|key| map.remove(&key).map(|value| (key, value))) {
                    Some((key, Value::Array(items))) => {
                        tracing::debug!(
                            "{} payload wraps {} entries under '{}'",
                            source,
                            items.len(),
                            key
                        );
                        Ok(items)
                    }
                    _ => {
                        let keys: Vec<&String> = map.keys().collect();
                        tracing::warn!("{} payload has no list value (keys: {:?})", source, keys);
                        Err(AppError::UpstreamFormat(format!(
                            "{} response object does not contain a list",
                            source
                        )))
                    }
                }
            }
            UpstreamPayload::Text(text) => {
                tracing::warn!(
                    "{} payload is a bare string: {}",
                    source,
                    preview(&text)
                );
                Err(AppError::UpstreamFormat(format!(
                    "{} returned a string instead of a JSON list",
                    source
                )))
            }
            UpstreamPayload::Scalar(value) => {
                tracing::warn!("{} payload is a scalar: {}", source, value);
                Err(AppError::UpstreamFormat(format!(
                    "{} returned a scalar instead of a JSON list",
                    source
                )))
            }
        }
    }
}

/// Normalizes a raw upstream body into its list of entries.
pub fn normalize(source: UpstreamSource, raw: Value) -> Result<Vec<Value>, AppError> {
    UpstreamPayload::from(raw).into_entries(source)
}

fn preview(text: &str) -> String {
    const MAX: usize = 120;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// First non-null value among `keys`.
fn first_present<'a>(entry: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| entry.get(*key))
        .find(|value| !value.is_null())
}

fn customer_id_of(entry: &Map<String, Value>) -> Option<(&Value, CustomerKey)> {
    CUSTOMER_ID_KEYS
        .iter()
        .filter_map(|key| entry.get(*key))
        .find_map(|value| CustomerKey::from_value(value).map(|key| (value, key)))
}

fn field_or(entry: &Map<String, Value>, key: &str, default: Value) -> Value {
    match entry.get(key) {
        Some(value) if !value.is_null() => value.clone(),
        _ => default,
    }
}

pub fn validate_segment(entry: &Value) -> Result<CustomerSegment, SkipReason> {
    let entry = entry.as_object().ok_or(SkipReason::NotAnObject)?;
    let (_, customer_id) = customer_id_of(entry).ok_or(SkipReason::MissingCustomerId)?;
    let segment = first_present(entry, SEGMENT_KEYS).ok_or(SkipReason::MissingField("segmento"))?;

    Ok(CustomerSegment {
        customer_id,
        segment: segment.clone(),
    })
}

pub fn validate_customer(entry: &Value) -> Result<Customer, SkipReason> {
    let entry = entry.as_object().ok_or(SkipReason::NotAnObject)?;
    let (_, customer_id) = customer_id_of(entry).ok_or(SkipReason::MissingCustomerId)?;
    let full_name =
        first_present(entry, FULL_NAME_KEYS).ok_or(SkipReason::MissingField("fullname"))?;

    Ok(Customer {
        customer_id,
        full_name: full_name.clone(),
    })
}

/// Checks one purchase-detail entry and fills in the purchase defaults.
pub fn validate_detail(entry: &Value) -> Result<PurchaseDetail, SkipReason> {
    let entry = entry.as_object().ok_or(SkipReason::NotAnObject)?;
    let (customer_id, key) = customer_id_of(entry).ok_or(SkipReason::MissingCustomerId)?;

    Ok(PurchaseDetail {
        key,
        customer_id: customer_id.clone(),
        purchase_count: field_or(entry, PURCHASE_COUNT_KEY, json!(0)),
        purchase_cost: field_or(entry, PURCHASE_COST_KEY, json!(0)),
        last_purchase: field_or(entry, LAST_PURCHASE_KEY, json!("")),
    })
}

/// Builds a lookup keyed by customer. Invalid entries are logged and left out;
/// on duplicate ids the later entry wins.
fn index_entries<F>(
    source: UpstreamSource,
    entries: &[Value],
    validate: F,
) -> HashMap<CustomerKey, Value>
where
    F: Fn(&Value) -> Result<(CustomerKey, Value), SkipReason>,
{
    let mut index = HashMap::with_capacity(entries.len());
    let mut skipped = 0usize;

    for (position, entry) in entries.iter().enumerate() {
        match validate(entry) {
            Ok((key, value)) => {
                index.insert(key, value);
            }
            Err(reason) => {
                skipped += 1;
                tracing::warn!("Skipping {} entry #{}: {}", source, position, reason);
            }
        }
    }

    tracing::debug!(
        "Indexed {} {} entries ({} skipped)",
        index.len(),
        source,
        skipped
    );
    index
}

/// Left-joins the details onto the segment and name lookups, in detail order.
fn join(
    details: &[Value],
    segment_by_id: &HashMap<CustomerKey, Value>,
    name_by_id: &HashMap<CustomerKey, Value>,
) -> Consolidation {
    let mut records = Vec::with_capacity(details.len());
    let mut stats = ConsolidationStats::default();

    for (position, entry) in details.iter().enumerate() {
        let detail = match validate_detail(entry) {
            Ok(detail) => detail,
            Err(reason) => {
                stats.skipped += 1;
                tracing::warn!("Skipping purchase detail #{}: {}", position, reason);
                continue;
            }
        };

        records.push(ConsolidatedRecord {
            name: name_by_id
                .get(&detail.key)
                .cloned()
                .unwrap_or_else(|| json!(NAME_UNAVAILABLE)),
            segment: segment_by_id
                .get(&detail.key)
                .cloned()
                .unwrap_or_else(|| json!(NO_SEGMENT)),
            customer_id: detail.customer_id,
            purchase_count: detail.purchase_count,
            purchase_cost: detail.purchase_cost,
            ultima_compra: detail.last_purchase,
        });
        stats.processed += 1;
    }

    Consolidation { records, stats }
}

/// Consolidates the raw upstream bodies into one record per valid purchase detail.
///
/// Segments, customers and the first detail page are required: if any of them
/// cannot be normalized the whole call fails with [`AppError::UpstreamFormat`].
/// The second detail page is optional and is dropped with a warning when malformed.
pub fn consolidate(
    segments: Value,
    customers: Value,
    details_page1: Value,
    details_page2: Option<Value>,
) -> Result<Consolidation, AppError> {
    let segments = normalize(UpstreamSource::Segments, segments)?;
    let customers = normalize(UpstreamSource::Customers, customers)?;
    let mut details = normalize(UpstreamSource::DetailsPage1, details_page1)?;

    match details_page2.map(|raw| normalize(UpstreamSource::DetailsPage2, raw)) {
        Some(Ok(more)) => details.extend(more),
        Some(Err(e)) => tracing::warn!("Ignoring purchase details page 2: {}", e),
        None => tracing::debug!("No purchase details page 2 available"),
    }

    let segment_by_id = index_entries(UpstreamSource::Segments, &segments, |entry| {
        validate_segment(entry).map(|s| (s.customer_id, s.segment))
    });
    let name_by_id = index_entries(UpstreamSource::Customers, &customers, |entry| {
        validate_customer(entry).map(|c| (c.customer_id, c.full_name))
    });

    let consolidation = join(&details, &segment_by_id, &name_by_id);

    tracing::info!(
        "Consolidated {} records ({} detail entries skipped)",
        consolidation.stats.processed,
        consolidation.stats.skipped
    );

    Ok(consolidation)
}
