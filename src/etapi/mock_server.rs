//! In-process ETAPI stand-in for tests.
//!
//! Serves the subset of endpoints the client uses under `/etapi`, records
//! every request it receives, and keeps a tiny in-memory note store so reads
//! reflect earlier writes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::config::EtapiConfig;
use crate::etapi::TriliumClient;

pub(crate) const TEST_TOKEN: &str = "test-token";

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body should be JSON")
    }
}

#[derive(Default)]
struct Store {
    requests: Vec<RecordedRequest>,
    notes: HashMap<String, Value>,
    contents: HashMap<String, String>,
    attributes: HashMap<String, Value>,
    next_id: u32,
}

type SharedStore = Arc<Mutex<Store>>;

pub(crate) struct MockEtapi {
    pub url: String,
    store: SharedStore,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockEtapi {
    /// Spawn the server on an ephemeral port with a couple of seeded notes.
    ///
    /// Seeded: `root`, `P1`, and `N1` ("Welcome", cloned under `P0` and `P2`)
    /// with content `<p>Hello</p>` and one label `attr1`.
    pub async fn spawn() -> Self {
        crate::etapi::install_crypto_provider();

        let mut store = Store::default();
        for (id, title, parents) in [
            ("root", "root", vec![]),
            ("P1", "Projects", vec!["root"]),
            ("N1", "Welcome", vec!["P0", "P2"]),
        ] {
            store.notes.insert(
                id.to_string(),
                json!({
                    "noteId": id,
                    "title": title,
                    "type": "text",
                    "mime": "text/html",
                    "isProtected": false,
                    "dateCreated": "2025-01-01 00:00:00.000+0000",
                    "dateModified": "2025-01-01 00:00:00.000+0000",
                    "parentNoteIds": parents,
                    "childNoteIds": [],
                }),
            );
        }
        store
            .contents
            .insert("N1".to_string(), "<p>Hello</p>".to_string());
        store.attributes.insert(
            "attr1".to_string(),
            json!({
                "attributeId": "attr1",
                "noteId": "N1",
                "type": "label",
                "name": "todo",
                "value": "",
                "isInheritable": false,
            }),
        );
        let store = Arc::new(Mutex::new(store));

        let app = Router::new().fallback(handle).with_state(Arc::clone(&store));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}/etapi", addr),
            store,
            _handle: handle,
        }
    }

    pub fn config(&self) -> EtapiConfig {
        EtapiConfig::new(Some(self.url.clone()), Some(TEST_TOKEN.to_string())).unwrap()
    }

    pub fn client(&self) -> TriliumClient {
        TriliumClient::new(&self.config()).unwrap()
    }

    pub fn client_with_token(&self, token: &str) -> TriliumClient {
        let config = EtapiConfig::new(Some(self.url.clone()), Some(token.to_string())).unwrap();
        TriliumClient::new(&config).unwrap()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.store.lock().unwrap().requests.clone()
    }

    /// `METHOD /path` for every recorded request, in arrival order.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }
}

fn error(status: StatusCode, code: &str, message: String) -> Response {
    (
        status,
        axum::Json(json!({
            "status": status.as_u16(),
            "code": code,
            "message": message,
        })),
    )
        .into_response()
}

fn note_not_found(id: &str) -> Response {
    error(
        StatusCode::NOT_FOUND,
        "NOTE_NOT_FOUND",
        format!("Note '{}' not found.", id),
    )
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

async fn handle(
    State(store): State<SharedStore>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri
        .path()
        .strip_prefix("/etapi")
        .unwrap_or(uri.path())
        .to_string();
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let mut store = store.lock().unwrap();
    store.requests.push(RecordedRequest {
        method: method.as_str().to_string(),
        path: path.clone(),
        query: query.clone(),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body: body.clone(),
    });

    if header_value(header::AUTHORIZATION).as_deref() != Some(TEST_TOKEN) {
        return error(
            StatusCode::UNAUTHORIZED,
            "NOT_AUTHENTICATED",
            "Not authenticated".to_string(),
        );
    }

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let parsed = || serde_json::from_str::<Value>(&body).unwrap_or(Value::Null);

    match (method.as_str(), segments.as_slice()) {
        ("GET", ["notes"]) => {
            let term = query.get("search").cloned().unwrap_or_default();
            let mut results: Vec<Value> = store
                .notes
                .values()
                .filter(|note| note["title"].as_str().unwrap_or("").contains(term.as_str()))
                .cloned()
                .collect();
            results.sort_by(|a, b| a["noteId"].as_str().cmp(&b["noteId"].as_str()));
            axum::Json(json!({ "results": results })).into_response()
        }
        ("GET", ["notes", id]) => match store.notes.get(*id) {
            Some(note) => axum::Json(note.clone()).into_response(),
            None => note_not_found(id),
        },
        ("GET", ["notes", id, "content"]) => match store.notes.get(*id) {
            Some(_) => (
                [(header::CONTENT_TYPE, "text/html")],
                store.contents.get(*id).cloned().unwrap_or_default(),
            )
                .into_response(),
            None => note_not_found(id),
        },
        ("PATCH", ["notes", id]) => {
            let patch = parsed();
            match store.notes.get_mut(*id) {
                Some(note) => {
                    merge(note, &patch);
                    axum::Json(note.clone()).into_response()
                }
                None => note_not_found(id),
            }
        }
        ("PUT", ["notes", id, "content"]) => {
            if !store.notes.contains_key(*id) {
                return note_not_found(id);
            }
            store.contents.insert(id.to_string(), body.clone());
            StatusCode::NO_CONTENT.into_response()
        }
        ("POST", ["create-note"]) => {
            let params = parsed();
            let parent = params["parentNoteId"].as_str().unwrap_or("").to_string();
            if !store.notes.contains_key(&parent) {
                return note_not_found(&parent);
            }
            store.next_id += 1;
            let id = format!("new{}", store.next_id);
            let note = json!({
                "noteId": id,
                "title": params["title"],
                "type": params["type"],
                "mime": params.get("mime").cloned().unwrap_or(json!("text/html")),
                "isProtected": false,
                "dateCreated": "2025-01-02 00:00:00.000+0000",
                "dateModified": "2025-01-02 00:00:00.000+0000",
                "parentNoteIds": [parent],
                "childNoteIds": [],
            });
            store.notes.insert(id.clone(), note.clone());
            if let Some(content) = params["content"].as_str() {
                store.contents.insert(id.clone(), content.to_string());
            }
            (
                StatusCode::CREATED,
                axum::Json(json!({
                    "note": note,
                    "branch": {
                        "branchId": format!("{}_{}", parent, id),
                        "noteId": id,
                        "parentNoteId": parent,
                        "prefix": null,
                        "notePosition": 10,
                        "isExpanded": false,
                    },
                })),
            )
                .into_response()
        }
        ("POST", ["attributes"]) => {
            let params = parsed();
            let owner = params["noteId"].as_str().unwrap_or("").to_string();
            if !store.notes.contains_key(&owner) {
                return note_not_found(&owner);
            }
            store.next_id += 1;
            let id = format!("attr-new{}", store.next_id);
            let mut attribute = params;
            merge(&mut attribute, &json!({ "attributeId": id }));
            store.attributes.insert(id, attribute.clone());
            (StatusCode::CREATED, axum::Json(attribute)).into_response()
        }
        ("PATCH", ["attributes", id]) => {
            let patch = parsed();
            match store.attributes.get_mut(*id) {
                Some(attribute) => {
                    merge(attribute, &patch);
                    axum::Json(attribute.clone()).into_response()
                }
                None => error(
                    StatusCode::NOT_FOUND,
                    "ATTRIBUTE_NOT_FOUND",
                    format!("Attribute '{}' not found.", id),
                ),
            }
        }
        ("DELETE", ["attributes", id]) => match store.attributes.remove(*id) {
            Some(_) => StatusCode::NO_CONTENT.into_response(),
            None => error(
                StatusCode::NOT_FOUND,
                "ATTRIBUTE_NOT_FOUND",
                format!("Attribute '{}' not found.", id),
            ),
        },
        _ => error(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("No route for {} {}", method.as_str(), path),
        ),
    }
}
