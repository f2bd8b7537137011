//! Database connection management
//!
//! Speaks the Neo4j HTTP transactional endpoint: every query is one
//! `POST {base}/db/{database}/tx/commit` carrying a single statement, so a
//! session holds no server-side state and releasing it is purely local.

use crate::config::ConnectionConfig;
use crate::errors::{from_reqwest, http_status, malformed_response, neo4j_error, Result};
use dbemu_core::errors::{ExError, ExErrorKind};
use dbemu_core::session::{ConnectionProvider, GraphSession, Query, Row};
use dbemu_core::{log_op_end, log_op_error, log_op_start};
use dbemu_core_types::Sensitive;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Instant;
use url::Url;

const OP_CONNECT: &str = "connect";
const OP_RUN: &str = "run_query";

/// Statement used to verify credentials and reachability at startup
pub const CONNECTIVITY_QUERY: &str = "RETURN 1 AS ok";

#[derive(Serialize)]
struct TxRequest<'a> {
    statements: [Statement<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Statement<'a> {
    statement: &'a str,
    parameters: &'a Map<String, Value>,
    result_data_contents: [&'static str; 1],
}

#[derive(Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<Neo4jErrorEntry>,
}

#[derive(Deserialize)]
struct StatementResult {
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<DataRow>,
}

#[derive(Deserialize)]
struct DataRow {
    row: Vec<Value>,
}

#[derive(Deserialize)]
struct Neo4jErrorEntry {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Process-scoped handle to one Neo4j database
///
/// Holds the HTTP client (and its connection pool) for the whole run. The
/// connection is released when the provider is dropped.
#[derive(Debug)]
pub struct Neo4jHttpProvider {
    client: reqwest::blocking::Client,
    endpoint: Url,
    username: String,
    password: Sensitive<String>,
}

impl Neo4jHttpProvider {
    /// Build the client and verify the connection with a `RETURN 1` query
    ///
    /// # Errors
    ///
    /// `Config` if the URI cannot be mapped to the HTTP API; `Connection` if
    /// the server is unreachable, rejects the credentials or fails that query.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let start = Instant::now();
        log_op_start!(OP_CONNECT, uri = config.uri.as_str(), database = config.database.as_str());

        let result = Self::open(config).and_then(|provider| {
            provider.check_connectivity()?;
            Ok(provider)
        });
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(provider) => {
                log_op_end!(
                    OP_CONNECT,
                    duration_ms = duration_ms,
                    endpoint = provider.endpoint.as_str()
                );
            }
            Err(err) => {
                log_op_error!(OP_CONNECT, err, duration_ms = duration_ms);
            }
        }
        result
    }

    /// Build the client without touching the network
    ///
    /// # Errors
    ///
    /// `Config` for an unusable URI, `Connection` if the TLS backend cannot
    /// be initialized.
    pub fn open(config: &ConnectionConfig) -> Result<Self> {
        let endpoint = config.commit_endpoint()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| from_reqwest(OP_CONNECT, e))?;

        Ok(Self {
            client,
            endpoint,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// The transactional commit URL every query is posted to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn check_connectivity(&self) -> Result<()> {
        self.execute(&Query::new(CONNECTIVITY_QUERY))
            .map(|_| ())
            .map_err(|err| {
                let message = format!("Cannot connect to {}: {}", self.endpoint, err.detail());
                ExError::new(ExErrorKind::Connection)
                    .with_op(OP_CONNECT)
                    .with_message(message)
                    .with_source(err)
            })
    }

    /// One round trip: post the statement, decode the rows
    fn execute(&self, query: &Query) -> Result<Vec<Row>> {
        let body = TxRequest {
            statements: [Statement {
                statement: query.text(),
                parameters: query.params(),
                result_data_contents: ["row"],
            }],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.username, Some(self.password.expose()))
            .header(reqwest::header::ACCEPT, "application/json;charset=UTF-8")
            .json(&body)
            .send()
            .map_err(|e| from_reqwest(OP_RUN, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(http_status(OP_RUN, status, &text));
        }

        let text = response.text().map_err(|e| from_reqwest(OP_RUN, e))?;
        decode_response(&text)
    }
}

impl Drop for Neo4jHttpProvider {
    fn drop(&mut self) {
        tracing::debug!(endpoint = self.endpoint.as_str(), "Connection released");
    }
}

/// Turn a transactional response body into rows keyed by column name
fn decode_response(text: &str) -> Result<Vec<Row>> {
    let response: TxResponse = serde_json::from_str(text)
        .map_err(|e| malformed_response(OP_RUN, format!("invalid response body: {}", e)))?;

    if let Some(err) = response.errors.first() {
        return Err(neo4j_error(OP_RUN, &err.code, &err.message));
    }

    let Some(result) = response.results.into_iter().next() else {
        return Err(malformed_response(OP_RUN, "response has no result set"));
    };

    let columns = result.columns;
    result
        .data
        .into_iter()
        .map(|data| {
            if data.row.len() != columns.len() {
                return Err(malformed_response(
                    OP_RUN,
                    format!(
                        "row has {} values for {} columns",
                        data.row.len(),
                        columns.len()
                    ),
                ));
            }
            Ok(columns.iter().cloned().zip(data.row).collect())
        })
        .collect()
}

/// A scoped session over the shared client
struct HttpSession<'a> {
    provider: &'a Neo4jHttpProvider,
    queries: usize,
}

impl GraphSession for HttpSession<'_> {
    fn run(&mut self, query: &Query) -> Result<Vec<Row>> {
        self.queries += 1;
        self.provider.execute(query)
    }
}

impl Drop for HttpSession<'_> {
    fn drop(&mut self) {
        tracing::trace!(queries = self.queries, "Session closed");
    }
}

impl ConnectionProvider for Neo4jHttpProvider {
    fn session(&self) -> Result<Box<dyn GraphSession + '_>> {
        Ok(Box::new(HttpSession {
            provider: self,
            queries: 0,
        }))
    }
}
