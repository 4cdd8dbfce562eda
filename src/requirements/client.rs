//! HTTP client for the requirements-management service.

use crate::requirements::{RequirementsError, RequirementsResult};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// A product requirements document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prd {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One requirement chunk inside a PRD.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementChunk {
    pub id: String,
    pub prd_id: String,
    pub title: String,
    pub content: String,
    pub status: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// A dependency between two chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkDependency {
    pub from_id: String,
    pub to_id: String,
    pub kind: String,
}

/// Dependency graph of a PRD's chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub chunks: Vec<RequirementChunk>,
    pub dependencies: Vec<ChunkDependency>,
}

/// One semantic-search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: RequirementChunk,
    pub score: f64,
}

/// Bearer-token client with a bounded request timeout.
pub struct RequirementsClient {
    base_url: String,
    token: String,
    agent: ureq::Agent,
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

impl RequirementsClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let agent = ureq::config::Config::builder()
            .http_status_as_error(false)
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .new_agent();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            agent,
        }
    }

    pub fn list_prds(&self) -> RequirementsResult<Vec<Prd>> {
        self.get("/api/prds")
    }

    pub fn get_prd(&self, id: &str) -> RequirementsResult<Prd> {
        self.get(&format!("/api/prds/{}", id))
    }

    pub fn create_prd(&self, prd: &Prd) -> RequirementsResult<Prd> {
        self.post("/api/prds", prd)
    }

    pub fn update_prd(&self, prd: &Prd) -> RequirementsResult<Prd> {
        self.put(&format!("/api/prds/{}", prd.id), prd)
    }

    pub fn delete_prd(&self, id: &str) -> RequirementsResult<()> {
        self.delete(&format!("/api/prds/{}", id))
    }

    pub fn list_chunks(&self, prd_id: &str) -> RequirementsResult<Vec<RequirementChunk>> {
        self.get(&format!("/api/prds/{}/chunks", prd_id))
    }

    pub fn get_chunk(&self, id: &str) -> RequirementsResult<RequirementChunk> {
        self.get(&format!("/api/chunks/{}", id))
    }

    pub fn create_chunk(&self, chunk: &RequirementChunk) -> RequirementsResult<RequirementChunk> {
        self.post(&format!("/api/prds/{}/chunks", chunk.prd_id), chunk)
    }

    pub fn update_chunk(&self, chunk: &RequirementChunk) -> RequirementsResult<RequirementChunk> {
        self.put(&format!("/api/chunks/{}", chunk.id), chunk)
    }

    pub fn delete_chunk(&self, id: &str) -> RequirementsResult<()> {
        self.delete(&format!("/api/chunks/{}", id))
    }

    pub fn chunk_dependencies(&self, id: &str) -> RequirementsResult<Vec<ChunkDependency>> {
        self.get(&format!("/api/chunks/{}/dependencies", id))
    }

    pub fn dependency_graph(&self, prd_id: &str) -> RequirementsResult<DependencyGraph> {
        self.get(&format!("/api/prds/{}/graph", prd_id))
    }

    pub fn semantic_search(&self, query: &str, limit: usize) -> RequirementsResult<Vec<SearchResult>> {
        #[derive(Serialize)]
        struct SearchRequest<'a> {
            query: &'a str,
            limit: usize,
        }
        self.post("/api/search", &SearchRequest { query, limit })
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> RequirementsResult<T> {
        let response = self
            .agent
            .get(&format!("{}{}", self.base_url, path))
            .header("Authorization", &format!("Bearer {}", self.token))
            .call()
            .map_err(|e| RequirementsError::RequestFailed(e.to_string()))?;
        Self::read_json(response)
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> RequirementsResult<T> {
        let response = self
            .agent
            .post(&format!("{}{}", self.base_url, path))
            .header("Authorization", &format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
            .send_json(body)
            .map_err(|e| RequirementsError::RequestFailed(e.to_string()))?;
        Self::read_json(response)
    }

    fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> RequirementsResult<T> {
        let response = self
            .agent
            .put(&format!("{}{}", self.base_url, path))
            .header("Authorization", &format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
            .send_json(body)
            .map_err(|e| RequirementsError::RequestFailed(e.to_string()))?;
        Self::read_json(response)
    }

    fn delete(&self, path: &str) -> RequirementsResult<()> {
        let response = self
            .agent
            .delete(&format!("{}{}", self.base_url, path))
            .header("Authorization", &format!("Bearer {}", self.token))
            .call()
            .map_err(|e| RequirementsError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(RequirementsError::ApiError { status, message });
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(
        response: ureq::http::Response<ureq::Body>,
    ) -> RequirementsResult<T> {
        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(RequirementsError::ApiError { status, message });
        }
        response
            .into_body()
            .read_json()
            .map_err(|e| RequirementsError::ParseError(e.to_string()))
    }
}
