use async_trait::async_trait;
use reqwest::{Request, Response};
use std::collections::HashMap;
use std::sync::Mutex;

use super::client::HttpClient;

/// Canned responses keyed by URL. Unknown URLs get a 404.
#[derive(Default)]
pub struct StubClient {
    routes: HashMap<String, (u16, &'static str)>,
    requests: Mutex<Vec<(reqwest::Method, String)>>,
}

impl StubClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, status: u16, body: &'static str) -> Self {
        self.routes.insert(url.to_string(), (status, body));
        self
    }

    pub fn requests(&self) -> Vec<(reqwest::Method, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for StubClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        let url = req.url().to_string();
        self.requests
            .lock()
            .unwrap()
            .push((req.method().clone(), url.clone()));

        let (status, body) = self.routes.get(&url).copied().unwrap_or((404, "not found"));
        let resp = http::Response::builder()
            .status(status)
            .body(body)
            .unwrap();
        Ok(Response::from(resp))
    }
}
