// Vector index backed by an existing Qdrant collection (read-only)
//
// Payloads may keep tags at the top level or nested under `metadata`
// (LangChain layout); filters match either. Searches are exact so equal
// scores come back in the same order for a given collection state.
use async_trait::async_trait;
use qdrant_client::{
    qdrant::{
        condition::ConditionOneOf, point_id::PointIdOptions, r#match::MatchValue,
        value::Kind, with_payload_selector::SelectorOptions, Condition, FieldCondition, Filter,
        Match, PointId, ScoredPoint, SearchParams, SearchPoints, Value as QdrantValue,
        WithPayloadSelector,
    },
    Qdrant,
};
use std::collections::{BTreeMap, HashMap};

use crate::errors::{RagError, Result};
use crate::store::{MetadataFilter, Passage, RetrievalResult, ScoredPassage, VectorIndex};

/// Payload keys that may carry the passage text
const CONTENT_KEYS: [&str; 2] = ["document", "page_content"];

/// Nested payload object flattened into metadata
const NESTED_METADATA_KEY: &str = "metadata";

/// Search client bound to one collection
pub struct QdrantIndex {
    client: Qdrant,
    url: String,
    collection: String,
}

impl QdrantIndex {
    /// Connect and verify the collection exists. Fails with `StoreUnavailable`.
    pub async fn connect(url: &str, collection: &str) -> Result<Self> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| RagError::StoreUnavailable(format!("Failed to create Qdrant client: {}", e)))?;

        let collections = client.list_collections().await.map_err(|e| {
            RagError::StoreUnavailable(format!("Qdrant at {} unreachable: {}", url, e))
        })?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == collection);

        if !exists {
            return Err(RagError::StoreUnavailable(format!(
                "collection '{}' not found at {}",
                collection, url
            )));
        }

        Ok(Self {
            client,
            url: url.to_string(),
            collection: collection.to_string(),
        })
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn nearest(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<RetrievalResult> {
        let search_result = self
            .client
            .search_points(search_request(&self.collection, vector, k, filter))
            .await
            .map_err(|e| RagError::Generic(format!("Qdrant search failed: {}", e)))?;

        Ok(search_result.result.into_iter().map(to_scored_passage).collect())
    }

    fn describe(&self) -> String {
        format!("qdrant {} collection '{}'", self.url, self.collection)
    }
}

/// Exact (brute-force) search request; ties keep a stable order
fn search_request(
    collection: &str,
    vector: &[f32],
    k: usize,
    filter: Option<&MetadataFilter>,
) -> SearchPoints {
    SearchPoints {
        collection_name: collection.to_string(),
        vector: vector.to_vec(),
        limit: k as u64,
        with_payload: Some(WithPayloadSelector {
            selector_options: Some(SelectorOptions::Enable(true)),
        }),
        filter: filter.map(keyword_filter),
        params: Some(SearchParams {
            exact: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Exact keyword match on one payload field, top-level or under `metadata`
fn keyword_filter(filter: &MetadataFilter) -> Filter {
    let nested_key = format!("{}.{}", NESTED_METADATA_KEY, filter.key);

    Filter {
        should: vec![
            keyword_condition(&filter.key, &filter.value),
            keyword_condition(&nested_key, &filter.value),
        ],
        ..Default::default()
    }
}

fn keyword_condition(key: &str, value: &str) -> Condition {
    Condition {
        condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
            key: key.to_string(),
            r#match: Some(Match {
                match_value: Some(MatchValue::Keyword(value.to_string())),
            }),
            ..Default::default()
        })),
    }
}

fn to_scored_passage(point: ScoredPoint) -> ScoredPassage {
    let payload = point.payload;

    let content = CONTENT_KEYS
        .iter()
        .find_map(|key| payload.get(*key).and_then(qdrant_value_to_string))
        .unwrap_or_default();

    let metadata = flatten_payload(&payload);

    ScoredPassage {
        passage: Passage::new(point_id_to_string(&point.id), content, metadata),
        score: point.score,
    }
}

/// Scalar payload fields become metadata; a nested `metadata` struct is merged in
fn flatten_payload(payload: &HashMap<String, QdrantValue>) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();

    for (key, value) in payload {
        if CONTENT_KEYS.contains(&key.as_str()) {
            continue;
        }
        if key == NESTED_METADATA_KEY {
            if let Some(Kind::StructValue(nested)) = &value.kind {
                for (k, v) in &nested.fields {
                    if let Some(s) = qdrant_value_to_string(v) {
                        metadata.entry(k.clone()).or_insert(s);
                    }
                }
            }
            continue;
        }
        if let Some(s) = qdrant_value_to_string(value) {
            metadata.insert(key.clone(), s);
        }
    }

    metadata
}

fn qdrant_value_to_string(value: &QdrantValue) -> Option<String> {
    value.kind.as_ref().and_then(|kind| match kind {
        Kind::StringValue(s) => Some(s.clone()),
        Kind::IntegerValue(i) => Some(i.to_string()),
        Kind::DoubleValue(f) => Some(f.to_string()),
        Kind::BoolValue(b) => Some(b.to_string()),
        _ => None,
    })
}

fn point_id_to_string(point_id: &Option<PointId>) -> String {
    point_id
        .as_ref()
        .and_then(|id| match &id.point_id_options {
            Some(PointIdOptions::Num(n)) => Some(n.to_string()),
            Some(PointIdOptions::Uuid(u)) => Some(u.clone()),
            None => None,
        })
        .unwrap_or_else(|| "unknown".to_string())
}
