// Queryable, cacheable collections of entities.
//
// A store is bound to one listing URL and one item constructor. `fetch`
// performs a single full round trip and applies filtering, sorting, and
// paging in memory afterwards: correctness over one full collection, not
// streaming, and no server-side pagination is assumed.

use std::cmp::Ordering;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::debug;

use dirws_api::{WsClient, WsPath};

use crate::entity::{Entity, EntityExt, JsonMap};
use crate::error::StoreError;

/// Reshapes a raw listing response into entity-constructor-ready records.
pub type UnpackFn = fn(Value) -> Result<Vec<JsonMap>, StoreError>;

type MakeFn<E> = Arc<dyn Fn(JsonMap) -> Result<Arc<E>, StoreError> + Send + Sync>;

/// A collection of entities backed by one listing endpoint.
///
/// Scoped sub-stores are ordinary `Store`s whose URL is rooted at a
/// parent entity's canonical path; they are created on demand per
/// relationship query and live only as long as the caller keeps them.
pub struct Store<E> {
    service: Arc<WsClient>,
    url: WsPath,
    unpack: UnpackFn,
    make: MakeFn<E>,
    cache: RwLock<Arc<Vec<Arc<E>>>>,
}

impl<E: Entity> Store<E> {
    /// Bind a store to a listing URL and an item constructor, with the
    /// default unpack step (array of objects, order preserved).
    pub fn bind(
        service: Arc<WsClient>,
        url: WsPath,
        make: impl Fn(JsonMap) -> Result<Arc<E>, StoreError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            service,
            url,
            unpack: unpack_objects,
            make: Arc::new(make),
            cache: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Override the unpack step for listings with a non-default shape.
    pub fn with_unpack(mut self, unpack: UnpackFn) -> Self {
        self.unpack = unpack;
        self
    }

    /// The listing URL this store is bound to.
    pub fn url(&self) -> &WsPath {
        &self.url
    }

    /// Snapshot of the most recent successful fetch, in response order.
    /// Retained unchanged across failed fetches.
    pub fn cached(&self) -> Arc<Vec<Arc<E>>> {
        Arc::clone(&self.cache.read().expect("result cache lock poisoned"))
    }

    /// Fetch the full collection, wrap each row exactly once, cache the
    /// result, and return it with the query applied.
    ///
    /// On failure the previous cached result set is left in place so an
    /// observing UI does not flicker to empty on a transient error.
    pub async fn fetch(&self, query: &FetchQuery) -> Result<Vec<Arc<E>>, StoreError> {
        debug!(url = %self.url, "fetching listing");
        let response = self.service.get_json(&self.url).await?;
        let records = (self.unpack)(response)?;

        let mut items = Vec::with_capacity(records.len());
        for record in records {
            items.push((self.make)(record)?);
        }
        let full = Arc::new(items);
        *self.cache.write().expect("result cache lock poisoned") = Arc::clone(&full);

        Ok(query.apply(&full))
    }
}

// ── Unpack steps ────────────────────────────────────────────────────

/// Default unpack: a JSON array of objects, or an `{"items": [...]}`
/// wrapper around one. Response order is preserved.
pub fn unpack_objects(response: Value) -> Result<Vec<JsonMap>, StoreError> {
    let items = unwrap_items(response)?;
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::service(format!(
                "expected an object row, got {other}"
            ))),
        })
        .collect()
}

/// Unpack objects and stamp each record with its original sequence
/// position as `search_order`, before any sort or filter runs.
///
/// Reserved for stable tie-break ordering of otherwise unsorted
/// listings; nothing consumes it yet.
pub fn unpack_with_search_order(response: Value) -> Result<Vec<JsonMap>, StoreError> {
    let mut records = unpack_objects(response)?;
    for (position, record) in records.iter_mut().enumerate() {
        record.insert("search_order".to_owned(), Value::from(position));
    }
    Ok(records)
}

/// Unpack a bare array of scalar identifiers (e.g. IP address strings)
/// into `{"ip_str": value}` records.
pub fn unpack_scalars(response: Value) -> Result<Vec<JsonMap>, StoreError> {
    let items = unwrap_items(response)?;
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => {
                let mut record = JsonMap::new();
                record.insert("ip_str".to_owned(), Value::String(s));
                Ok(record)
            }
            other => Err(StoreError::service(format!(
                "expected a scalar row, got {other}"
            ))),
        })
        .collect()
}

fn unwrap_items(response: Value) -> Result<Vec<Value>, StoreError> {
    match response {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(StoreError::service(
                "listing response has no `items` array",
            )),
        },
        other => Err(StoreError::service(format!(
            "unexpected listing response: {other}"
        ))),
    }
}

// ── Query application ───────────────────────────────────────────────

/// One sort key: a raw field name and a direction.
#[derive(Debug, Clone)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

/// In-memory query over a fetched result set.
///
/// Filters are field-equality matches against raw values; sorting is
/// stable, so rows equal under every key keep response order.
#[derive(Debug, Clone, Default)]
pub struct FetchQuery {
    pub filter: Vec<(String, Value)>,
    pub sort: Vec<SortKey>,
    pub start: usize,
    pub count: Option<usize>,
}

impl FetchQuery {
    /// The identity query: everything, response order.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.push((field.into(), value.into()));
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sort.push(SortKey {
            field: field.into(),
            descending: false,
        });
        self
    }

    pub fn sort_desc(mut self, field: impl Into<String>) -> Self {
        self.sort.push(SortKey {
            field: field.into(),
            descending: true,
        });
        self
    }

    pub fn page(mut self, start: usize, count: usize) -> Self {
        self.start = start;
        self.count = Some(count);
        self
    }

    fn matches<E: Entity>(&self, entity: &E) -> bool {
        self.filter
            .iter()
            .all(|(field, expected)| entity.get_value(field).as_ref() == Some(expected))
    }

    fn compare<E: Entity>(&self, a: &E, b: &E) -> Ordering {
        for key in &self.sort {
            let ord = cmp_values(
                a.get_value(&key.field).as_ref(),
                b.get_value(&key.field).as_ref(),
            );
            let ord = if key.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    pub(crate) fn apply<E: Entity>(&self, items: &[Arc<E>]) -> Vec<Arc<E>> {
        let mut out: Vec<Arc<E>> = items
            .iter()
            .filter(|e| self.matches(e.as_ref()))
            .cloned()
            .collect();

        if !self.sort.is_empty() {
            out.sort_by(|a, b| self.compare(a.as_ref(), b.as_ref()));
        }

        if self.start >= out.len() {
            return Vec::new();
        }
        let end = self
            .count
            .map_or(out.len(), |c| self.start.saturating_add(c).min(out.len()));
        out[self.start..end].to_vec()
    }
}

/// Total order over loosely typed field values: missing < null < bool <
/// number < string < everything else.
fn cmp_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(Value::Array(_) | Value::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
