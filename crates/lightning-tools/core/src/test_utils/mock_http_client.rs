use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use platform_utils::{HttpClient, HttpError, HttpResponse};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct MockResponse {
    pub(crate) status_code: u16,
    pub(crate) text: String,
    pub(crate) headers: HashMap<String, String>,
    /// When set the request fails at the transport level instead.
    pub(crate) error: Option<HttpError>,
}

impl MockResponse {
    pub fn new(status_code: u16, text: String) -> Self {
        MockResponse {
            status_code,
            text,
            headers: HashMap::new(),
            error: None,
        }
    }

    pub fn json(status_code: u16, value: &serde_json::Value) -> Self {
        Self::new(status_code, value.to_string())
    }

    pub fn network_error() -> Self {
        MockResponse {
            error: Some(HttpError::Connect("connection refused".to_string())),
            ..Self::new(0, String::new())
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
}

/// Serves canned responses. Routed responses are matched by URL prefix in
/// insertion order; unmatched requests pop the shared FIFO queue.
#[derive(Default)]
pub struct MockHttpClient {
    routes: Mutex<Vec<(String, VecDeque<MockResponse>)>>,
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        MockHttpClient::default()
    }

    pub fn add_response(&self, response: MockResponse) -> &Self {
        debug!("Push response: {response:?}");
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn add_route(&self, url_prefix: &str, response: MockResponse) -> &Self {
        debug!("Push response for {url_prefix}: {response:?}");
        let mut routes = self.routes.lock().unwrap();
        match routes.iter_mut().find(|(prefix, _)| prefix == url_prefix) {
            Some((_, queue)) => queue.push_back(response),
            None => routes.push((url_prefix.to_string(), VecDeque::from([response]))),
        }
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }

    fn next_response(&self, url: &str) -> Option<MockResponse> {
        let mut routes = self.routes.lock().unwrap();
        let routed = routes
            .iter_mut()
            .find(|(prefix, queue)| url.starts_with(prefix.as_str()) && !queue.is_empty())
            .and_then(|(_, queue)| queue.pop_front());
        routed.or_else(|| self.responses.lock().unwrap().pop_front())
    }
}

#[async_trait::async_trait]
impl HttpClient for MockHttpClient {
    async fn get(
        &self,
        url: String,
        headers: Option<HashMap<String, String>>,
    ) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.clone(),
            headers: headers.unwrap_or_default(),
        });
        let response = self.next_response(&url).ok_or_else(|| {
            HttpError::Other(format!("No response available for GET request to {url}"))
        })?;
        debug!("Pop GET response for {url}: {response:?}");
        if let Some(error) = response.error {
            return Err(error);
        }

        Ok(HttpResponse {
            status: response.status_code,
            headers: response.headers,
            body: response.text,
        })
    }
}
