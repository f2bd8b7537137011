//! Fake Neo4j HTTP transactional endpoint for provider tests

use dbemu_store::config::{ConnectionConfig, ENV_PASSWORD, ENV_URI, ENV_USERNAME};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

pub const USERNAME: &str = "neo4j";
pub const PASSWORD: &str = "secret";
/// `Basic base64("neo4j:secret")`
const EXPECTED_AUTH: &str = "Basic bmVvNGo6c2VjcmV0";

#[derive(Clone)]
#[allow(dead_code)]
pub enum Fault {
    /// Respond 200 with a Neo4j `errors` entry
    Neo4j(&'static str, &'static str),
    /// Sleep before answering normally
    Delay(Duration),
    /// Respond with a bare HTTP status
    Status(u16),
}

/// What the fake database contains
#[derive(Clone, Default)]
pub struct FakeDb {
    nodes: BTreeMap<String, (Value, Vec<Value>)>,
    listed: Option<Vec<Value>>,
    faults: HashMap<String, Fault>,
    enumeration_fault: Option<Fault>,
}

#[allow(dead_code)]
impl FakeDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// `edges` are `(type, properties, target)` triples
    pub fn with_node(mut self, id: &str, props: Value, edges: Vec<(&str, Value, Value)>) -> Self {
        let edges = edges
            .into_iter()
            .map(|(t, p, n)| json!({"relationship": t, "properties": p, "target": n}))
            .collect();
        self.nodes.insert(id.to_string(), (props, edges));
        self
    }

    pub fn with_listed_ids(mut self, ids: Vec<Value>) -> Self {
        self.listed = Some(ids);
        self
    }

    pub fn with_fault(mut self, id: &str, fault: Fault) -> Self {
        self.faults.insert(id.to_string(), fault);
        self
    }

    pub fn with_enumeration_fault(mut self, fault: Fault) -> Self {
        self.enumeration_fault = Some(fault);
        self
    }

    fn answer(&self, statement: &str, params: &Value) -> (u16, Value) {
        if statement.starts_with("RETURN 1") {
            return rows_reply(&["ok"], vec![vec![json!(1)]]);
        }

        if let Some(id) = params.get("id") {
            // Nodes are string-keyed; an id of any other type matches nothing.
            let Some(id) = id.as_str() else {
                return rows_reply(&["entity", "relationships"], Vec::new());
            };
            if let Some(fault) = self.faults.get(id) {
                if let Some(reply) = apply(fault) {
                    return reply;
                }
            }
            return match self.nodes.get(id) {
                None => rows_reply(&["entity", "relationships"], Vec::new()),
                Some((props, edges)) => {
                    let mut collected = edges.clone();
                    if collected.is_empty() {
                        collected.push(json!({"relationship": null, "properties": null, "target": null}));
                    }
                    rows_reply(
                        &["entity", "relationships"],
                        vec![vec![props.clone(), Value::Array(collected)]],
                    )
                }
            };
        }

        if let Some(fault) = &self.enumeration_fault {
            if let Some(reply) = apply(fault) {
                return reply;
            }
        }
        let ids = match &self.listed {
            Some(ids) => ids.clone(),
            None => self.nodes.keys().map(|k| json!(k)).collect(),
        };
        rows_reply(&["id"], ids.into_iter().map(|id| vec![id]).collect())
    }
}

fn rows_reply(columns: &[&str], rows: Vec<Vec<Value>>) -> (u16, Value) {
    let data: Vec<Value> = rows.into_iter().map(|row| json!({ "row": row })).collect();
    (
        200,
        json!({"results": [{"columns": columns, "data": data}], "errors": []}),
    )
}

/// `None` once a delay has elapsed and the normal answer should follow
fn apply(fault: &Fault) -> Option<(u16, Value)> {
    match fault {
        Fault::Neo4j(code, message) => Some((
            200,
            json!({"results": [], "errors": [{"code": code, "message": message}]}),
        )),
        Fault::Delay(delay) => {
            std::thread::sleep(*delay);
            None
        }
        Fault::Status(status) => Some((*status, json!({}))),
    }
}

/// One request as the server saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub body: Value,
}

pub struct FakeNeo4j {
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[allow(dead_code)]
impl FakeNeo4j {
    pub fn start(db: FakeDb) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind fake server"));
        let addr = server
            .server_addr()
            .to_ip()
            .expect("fake server has an IP address");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let server = Arc::clone(&server);
            let requests = Arc::clone(&requests);
            let db = Arc::new(db);
            std::thread::spawn(move || {
                for request in server.incoming_requests() {
                    let requests = Arc::clone(&requests);
                    let db = Arc::clone(&db);
                    // One thread per request so a delayed answer blocks nobody else
                    std::thread::spawn(move || serve(request, &db, &requests));
                }
            })
        };

        Self {
            server,
            handle: Some(handle),
            url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Statements posted so far, in arrival order
    pub fn statements(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| {
                r.body["statements"][0]["statement"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }

    pub fn config(&self) -> ConnectionConfig {
        config_for(&self.url, PASSWORD)
    }
}

impl Drop for FakeNeo4j {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub fn config_for(uri: &str, password: &str) -> ConnectionConfig {
    let vars: HashMap<&str, String> = [
        (ENV_URI, uri.to_string()),
        (ENV_USERNAME, USERNAME.to_string()),
        (ENV_PASSWORD, password.to_string()),
    ]
    .into_iter()
    .collect();
    ConnectionConfig::from_lookup(|name| vars.get(name).cloned()).unwrap()
}

fn serve(
    mut request: tiny_http::Request,
    db: &FakeDb,
    requests: &Mutex<Vec<RecordedRequest>>,
) {
    let mut raw = String::new();
    let _ = request.as_reader().read_to_string(&mut raw);
    let body: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);
    let authorized = request
        .headers()
        .iter()
        .any(|h| h.field.equiv("Authorization") && h.value.as_str() == EXPECTED_AUTH);

    requests.lock().unwrap().push(RecordedRequest {
        path: request.url().to_string(),
        body: body.clone(),
    });

    let (status, reply) = if !authorized {
        (
            401,
            json!({"errors": [{
                "code": "Neo.ClientError.Security.Unauthorized",
                "message": "The client is unauthorized due to authentication failure."
            }]}),
        )
    } else {
        let statement = body["statements"][0]["statement"].as_str().unwrap_or_default();
        db.answer(statement, &body["statements"][0]["parameters"])
    };

    let content_type =
        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).expect("static header");
    let response = Response::from_string(reply.to_string())
        .with_status_code(status)
        .with_header(content_type);
    let _ = request.respond(response);
}
