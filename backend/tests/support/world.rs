//! Shared world for HTTP behaviour scenarios.
//!
//! Steps are synchronous, so the world owns an Actix system runner and
//! blocks on each request. Actors are named in the feature text ("a
//! signed-in admin") and keep their own session cookie.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;

use abroad::domain::Role;
use actix_rt::SystemRunner;
use actix_web::cookie::Cookie;
use actix_web::http::Method;
use actix_web::test::TestRequest;
use serde_json::Value;

use crate::stack::{Captured, Stack};

pub struct ApiWorld {
    runner: SystemRunner,
    pub stack: Stack,
    actor: RefCell<Option<String>>,
    cookies: RefCell<HashMap<String, Cookie<'static>>>,
    last: RefCell<Option<Captured>>,
    remembered: RefCell<HashMap<String, String>>,
}

impl ApiWorld {
    pub fn new() -> Self {
        Self {
            runner: actix_rt::System::new(),
            stack: Stack::new(),
            actor: RefCell::new(None),
            cookies: RefCell::new(HashMap::new()),
            last: RefCell::new(None),
            remembered: RefCell::new(HashMap::new()),
        }
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runner.block_on(future)
    }

    /// Seed an account for `actor`, sign it in and make it current.
    pub fn sign_in_as(&self, actor: &str, role: Role) {
        let email = format!("{}@example.test", actor.replace(' ', "-"));
        self.stack.seed(&email, role);
        let cookie = self.block_on(self.stack.sign_in(&email));
        self.cookies.borrow_mut().insert(actor.to_owned(), cookie);
        self.act_as(Some(actor));
    }

    pub fn act_as(&self, actor: Option<&str>) {
        *self.actor.borrow_mut() = actor.map(str::to_owned);
    }

    /// Send `request` with the current actor's cookie, if any.
    pub fn send(&self, request: TestRequest) -> u16 {
        let cookie = self
            .actor
            .borrow()
            .as_ref()
            .and_then(|actor| self.cookies.borrow().get(actor).cloned());
        let request = match cookie {
            Some(cookie) => request.cookie(cookie),
            None => request,
        };
        let captured = self.block_on(self.stack.send(request));
        let status = captured.status;
        *self.last.borrow_mut() = Some(captured);
        status
    }

    pub fn send_method(&self, method: &str, path: &str) -> u16 {
        let method = Method::from_bytes(method.as_bytes()).expect("HTTP method");
        self.send(TestRequest::default().method(method).uri(path))
    }

    pub fn with_last<R>(&self, inspect: impl FnOnce(&Captured) -> R) -> R {
        let last = self.last.borrow();
        inspect(last.as_ref().expect("a request was sent"))
    }

    pub fn last_status(&self) -> u16 {
        self.with_last(|captured| captured.status)
    }

    pub fn last_json(&self) -> Value {
        self.with_last(Captured::json)
    }

    pub fn remember(&self, key: &str, value: String) {
        self.remembered.borrow_mut().insert(key.to_owned(), value);
    }

    pub fn recall_or_default(&self, key: &str) -> String {
        self.remembered.borrow().get(key).cloned().unwrap_or_default()
    }

    pub fn recall(&self, key: &str) -> String {
        self.remembered
            .borrow()
            .get(key)
            .cloned()
            .unwrap_or_else(|| panic!("nothing remembered as {key}"))
    }
}
