//! User resource module
//!
//! The collaborator mounted on the router: an in-memory user store and its
//! CRUD handlers. The pipeline core makes no assumptions about this module
//! beyond the handler signature; validation responses here are the
//! handlers' own, outside the core's error taxonomy.

use std::sync::{Arc, Mutex};

use hyper::StatusCode;
use serde::{Deserialize, Serialize};

use crate::http::{Request, ResponseBuilder};
use crate::router::Router;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

/// In-memory user storage. Ids are never reused within a process.
#[derive(Debug, Default)]
struct UserStore {
    users: Vec<User>,
    next_id: u64,
}

impl UserStore {
    fn create(&mut self, name: String) -> User {
        self.next_id += 1;
        let user = User {
            id: self.next_id,
            name,
        };
        self.users.push(user.clone());
        user
    }

    fn find(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn rename(&mut self, id: u64, name: String) -> Option<User> {
        let user = self.users.iter_mut().find(|u| u.id == id)?;
        user.name = name;
        Some(user.clone())
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);
        self.users.len() != before
    }
}

type SharedStore = Arc<Mutex<UserStore>>;

/// Register the user routes. Called once at startup; the handlers share
/// one store for the life of the process.
pub fn register(router: &mut Router) {
    let store: SharedStore = Arc::default();

    let s = Arc::clone(&store);
    router.get("/users", move |_req, resp| {
        let store = s.lock().unwrap();
        resp.json(&store.users);
    });

    let s = Arc::clone(&store);
    router.get("/users/:id", move |req, resp| {
        let Some(id) = parse_id(req, resp) else { return };
        let store = s.lock().unwrap();
        match store.find(id) {
            Some(user) => {
                resp.json(user);
            }
            None => not_found(resp),
        }
    });

    let s = Arc::clone(&store);
    router.post("/users", move |req, resp| {
        let Some(name) = parse_name(req, resp) else { return };
        let mut store = s.lock().unwrap();
        let user = store.create(name);
        resp.status(StatusCode::CREATED).json(&user);
    });

    let s = Arc::clone(&store);
    router.put("/users/:id", move |req, resp| {
        let Some(id) = parse_id(req, resp) else { return };
        let Some(name) = parse_name(req, resp) else { return };
        let mut store = s.lock().unwrap();
        match store.rename(id, name) {
            Some(user) => {
                resp.json(&user);
            }
            None => not_found(resp),
        }
    });

    let s = Arc::clone(&store);
    router.delete("/users/:id", move |req, resp| {
        let Some(id) = parse_id(req, resp) else { return };
        let mut store = s.lock().unwrap();
        if store.remove(id) {
            resp.status(StatusCode::NO_CONTENT);
        } else {
            not_found(resp);
        }
    });
}

/// Captured `:id` segment as a number, or a 400 written to the response
fn parse_id(req: &Request, resp: &mut ResponseBuilder) -> Option<u64> {
    match req.param("id").and_then(|raw| raw.parse().ok()) {
        Some(id) => Some(id),
        None => {
            resp.status(StatusCode::BAD_REQUEST)
                .json(&serde_json::json!({ "error": "invalid user id" }));
            None
        }
    }
}

/// `name` field of the decoded body, or a 400 written to the response
fn parse_name(req: &Request, resp: &mut ResponseBuilder) -> Option<String> {
    match req
        .json()
        .and_then(|body| body.get("name"))
        .and_then(serde_json::Value::as_str)
    {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => {
            resp.status(StatusCode::BAD_REQUEST)
                .json(&serde_json::json!({ "error": "missing required field: name" }));
            None
        }
    }
}

fn not_found(resp: &mut ResponseBuilder) {
    resp.status(StatusCode::NOT_FOUND)
        .json(&serde_json::json!({ "error": "user not found" }));
}
