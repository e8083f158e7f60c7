use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::query::selected_fields;
use crate::entity::EntityKind;
use crate::error::{EtlError, Result};
use crate::parser::{flatten_records, Table};

pub const DEFAULT_ENDPOINT: &str = "https://spacex-production.up.railway.app/";

/// Anything that can produce the flattened rows of an entity kind
pub trait Source {
    fn fetch(&self, kind: EntityKind) -> Result<Table>;
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

pub struct GraphqlClient {
    client: Client,
    endpoint: String,
}

impl GraphqlClient {
    /// Create a client for an endpoint; `timeout` of `None` waits forever
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST a query and return the `data.<kind>` records
    pub fn fetch_records(&self, query: &str, kind: EntityKind) -> Result<Vec<Value>> {
        debug!(endpoint = %self.endpoint, %kind, "posting GraphQL query");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&GraphqlRequest { query })
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(EtlError::status(status, &text));
        }

        let body: GraphqlResponse = serde_json::from_str(&text)?;
        extract_records(body, kind)
    }

    /// Fetch and flatten one kind using an explicit query text
    pub fn fetch_with_query(&self, query: &str, kind: EntityKind) -> Result<Table> {
        let records = self.fetch_records(query, kind)?;
        let table = flatten_records(kind, &records)?;
        debug!(%kind, rows = table.len(), columns = table.columns().len(), "flattened response");

        if !table.is_empty() {
            for field in selected_fields(query) {
                if table.column_index(&field).is_none() {
                    warn!(%kind, %field, "requested field missing from response");
                }
            }
        }

        Ok(table)
    }
}

impl Source for GraphqlClient {
    fn fetch(&self, kind: EntityKind) -> Result<Table> {
        self.fetch_with_query(kind.query(), kind)
    }
}

fn extract_records(body: GraphqlResponse, kind: EntityKind) -> Result<Vec<Value>> {
    let records = body
        .data
        .and_then(|mut data| data.get_mut(kind.as_str()).map(Value::take));

    match records {
        Some(Value::Array(items)) => {
            if !body.errors.is_empty() {
                warn!(%kind, errors = body.errors.len(), "response carried GraphQL errors alongside data");
            }
            Ok(items)
        }
        _ if !body.errors.is_empty() => Err(EtlError::GraphQl(
            body.errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; "),
        )),
        _ => Err(EtlError::MissingData(kind)),
    }
}
