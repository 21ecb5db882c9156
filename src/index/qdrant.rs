use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, DeleteCollectionBuilder, DeletePointsBuilder,
    Distance, PointStruct, PointsIdsList, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use tracing::{debug, info};

use crate::constants::{DEFAULT_COLLECTION_NAME, DEFAULT_EMBEDDING_DIM};
use crate::entry::{EntryId, Payload, validate_embedding};

use super::backend::SimilarityIndex;
use super::error::IndexError;
use super::model::{IndexPoint, ScoredPoint, WriteConsistency, rank_order, validate_query};

/// Extra results requested so equal scores at the `k` boundary can be re-ordered by id.
pub const DEFAULT_TIE_OVERFETCH: usize = 8;
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

const PAYLOAD_REFERENCE: &str = "reference";
const PAYLOAD_TEXT: &str = "text";

#[derive(Debug, Clone)]
pub struct QdrantIndexConfig {
    pub url: String,
    pub collection_name: String,
    pub dimension: usize,
    pub consistency: WriteConsistency,
    pub tie_overfetch: usize,
}

impl Default for QdrantIndexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_QDRANT_URL)
    }
}

impl QdrantIndexConfig {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            dimension: DEFAULT_EMBEDDING_DIM,
            consistency: WriteConsistency::Strong,
            tie_overfetch: DEFAULT_TIE_OVERFETCH,
        }
    }

    pub fn collection_name(mut self, name: &str) -> Self {
        self.collection_name = name.to_string();
        self
    }

    pub fn dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn consistency(mut self, consistency: WriteConsistency) -> Self {
        self.consistency = consistency;
        self
    }
}

#[derive(Clone)]
/// Similarity index backed by a Qdrant collection with cosine distance.
///
/// Scores are Qdrant's cosine similarity, i.e. raw cosine in `[-1, 1]`.
///
/// Ties are broken by ascending id only among the `k + tie_overfetch` points the server
/// returns. If more points than that share the score at the `k` boundary, which of them the
/// server drops is up to Qdrant.
pub struct QdrantIndex {
    client: Qdrant,
    config: QdrantIndexConfig,
}

impl std::fmt::Debug for QdrantIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantIndex")
            .field("url", &self.config.url)
            .field("collection", &self.config.collection_name)
            .field("dimension", &self.config.dimension)
            .finish_non_exhaustive()
    }
}

impl QdrantIndex {
    /// Creates a client for `config.url`. Does not touch the collection.
    pub fn new(config: QdrantIndexConfig) -> Result<Self, IndexError> {
        let client =
            Qdrant::from_url(&config.url)
                .build()
                .map_err(|e| IndexError::ConnectionFailed {
                    url: config.url.clone(),
                    message: e.to_string(),
                })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &QdrantIndexConfig {
        &self.config
    }

    fn collection(&self) -> &str {
        &self.config.collection_name
    }

    /// Performs a basic health check request.
    pub async fn health_check(&self) -> Result<(), IndexError> {
        self.client
            .health_check()
            .await
            .map_err(|e| IndexError::ConnectionFailed {
                url: self.config.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn create_collection(&self) -> Result<(), IndexError> {
        let vectors_config =
            VectorParamsBuilder::new(self.config.dimension as u64, Distance::Cosine);

        self.client
            .create_collection(
                CreateCollectionBuilder::new(self.collection())
                    .vectors_config(vectors_config)
                    .on_disk_payload(true),
            )
            .await
            .map_err(|e| IndexError::CreateCollectionFailed {
                collection: self.collection().to_string(),
                message: e.to_string(),
            })?;

        info!(
            collection = self.collection(),
            dimension = self.config.dimension,
            "Created Qdrant collection"
        );
        Ok(())
    }

    async fn collection_exists(&self) -> Result<bool, IndexError> {
        self.client
            .collection_exists(self.collection())
            .await
            .map_err(|e| IndexError::CreateCollectionFailed {
                collection: self.collection().to_string(),
                message: e.to_string(),
            })
    }
}

fn search_limit(k: usize, tie_overfetch: usize) -> u64 {
    u64::try_from(k.saturating_add(tie_overfetch)).unwrap_or(u64::MAX)
}

fn to_point_struct(point: IndexPoint) -> PointStruct {
    let mut payload: HashMap<String, qdrant_client::qdrant::Value> = HashMap::new();
    payload.insert(PAYLOAD_REFERENCE.to_string(), point.payload.reference.into());
    payload.insert(PAYLOAD_TEXT.to_string(), point.payload.text.into());

    PointStruct::new(point.id.as_u64(), point.embedding, payload)
}

fn from_scored_point(point: qdrant_client::qdrant::ScoredPoint) -> Option<ScoredPoint> {
    let id = match point.id.and_then(|pid| pid.point_id_options) {
        Some(PointIdOptions::Num(n)) => EntryId::new(n),
        _ => return None,
    };

    let payload = point.payload;
    let field = |name: &str| {
        payload
            .get(name)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_default()
    };

    Some(ScoredPoint {
        id,
        score: point.score.clamp(-1.0, 1.0),
        payload: Payload::new(field(PAYLOAD_REFERENCE), field(PAYLOAD_TEXT)),
    })
}

impl SimilarityIndex for QdrantIndex {
    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn ensure_ready(&self) -> Result<(), IndexError> {
        if !self.collection_exists().await? {
            self.create_collection().await?;
        }
        Ok(())
    }

    async fn upsert_points(&self, points: Vec<IndexPoint>) -> Result<(), IndexError> {
        if points.is_empty() {
            return Ok(());
        }
        for point in &points {
            validate_embedding(point.id, &point.embedding, self.config.dimension)?;
        }

        let count = points.len();
        let qdrant_points: Vec<PointStruct> = points.into_iter().map(to_point_struct).collect();

        self.client
            .upsert_points(
                UpsertPointsBuilder::new(self.collection(), qdrant_points)
                    .wait(self.config.consistency.into()),
            )
            .await
            .map_err(|e| IndexError::UpsertFailed {
                collection: self.collection().to_string(),
                message: e.to_string(),
            })?;

        debug!(count, collection = self.collection(), "Upserted points");
        Ok(())
    }

    async fn delete_points(&self, ids: &[EntryId]) -> Result<(), IndexError> {
        if ids.is_empty() {
            return Ok(());
        }

        let points_selector = PointsIdsList {
            ids: ids.iter().map(|id| id.as_u64().into()).collect(),
        };

        self.client
            .delete_points(
                DeletePointsBuilder::new(self.collection())
                    .points(points_selector)
                    .wait(true),
            )
            .await
            .map_err(|e| IndexError::DeleteFailed {
                collection: self.collection().to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredPoint>, IndexError> {
        validate_query(embedding, self.config.dimension)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let limit = search_limit(k, self.config.tie_overfetch);
        let search_builder =
            SearchPointsBuilder::new(self.collection(), embedding.to_vec(), limit)
                .with_payload(true);

        let search_result = self
            .client
            .search_points(search_builder)
            .await
            .map_err(|e| IndexError::SearchFailed {
                collection: self.collection().to_string(),
                message: e.to_string(),
            })?;

        let mut results: Vec<ScoredPoint> = search_result
            .result
            .into_iter()
            .filter_map(from_scored_point)
            .collect();

        results.sort_by(rank_order);
        results.truncate(k);
        Ok(results)
    }

    async fn count(&self) -> Result<usize, IndexError> {
        let response = self
            .client
            .count(CountPointsBuilder::new(self.collection()).exact(true))
            .await
            .map_err(|e| IndexError::CountFailed {
                collection: self.collection().to_string(),
                message: e.to_string(),
            })?;

        Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
    }

    async fn clear(&self) -> Result<(), IndexError> {
        if self.collection_exists().await? {
            self.client
                .delete_collection(DeleteCollectionBuilder::new(self.collection()))
                .await
                .map_err(|e| IndexError::DeleteFailed {
                    collection: self.collection().to_string(),
                    message: e.to_string(),
                })?;
        }
        self.create_collection().await
    }
}
