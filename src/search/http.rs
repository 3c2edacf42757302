//! Blocking HTTP client for the composite search API

use super::content::ContentMetadata;
use super::traits::{SearchClient, SearchError, SearchResult};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    params: Option<ResponseParams>,
    #[serde(default)]
    result: Option<ResponseBody>,
}

#[derive(Debug, Deserialize)]
struct ResponseParams {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    errmsg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    content: Vec<ContentMetadata>,
}

/// Search client that POSTs an identifier filter to the search endpoint.
pub struct HttpSearchClient {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpSearchClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Request body selecting a single object by identifier.
fn request_body(id: &str) -> Value {
    json!({
        "request": {
            "filters": { "identifier": id },
            "limit": 1
        }
    })
}

/// Interpret a decoded search response for `id`.
fn parse_response(id: &str, response: SearchResponse) -> SearchResult<ContentMetadata> {
    if let Some(params) = &response.params {
        if let Some(status) = params.status.as_deref() {
            if !status.eq_ignore_ascii_case("successful") {
                return Err(SearchError::Service {
                    status: 200,
                    message: params.errmsg.clone().unwrap_or_else(|| status.to_string()),
                });
            }
        }
    }

    response
        .result
        .and_then(|body| body.content.into_iter().next())
        .ok_or_else(|| SearchError::NotFound(id.to_string()))
}

impl SearchClient for HttpSearchClient {
    fn search_content(&self, id: &str) -> SearchResult<ContentMetadata> {
        tracing::debug!(id, endpoint = %self.endpoint, "searching content");
        let response = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .send_json(request_body(id));

        match response {
            Ok(resp) => {
                let body: SearchResponse = serde_json::from_reader(resp.into_reader())?;
                parse_response(id, body)
            }
            Err(ureq::Error::Status(status, resp)) => {
                let message = resp.into_string().unwrap_or_default();
                Err(SearchError::Service { status, message })
            }
            Err(err) => Err(SearchError::Transport(err.to_string())),
        }
    }
}
