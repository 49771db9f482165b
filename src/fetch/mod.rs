// src/fetch/mod.rs
pub mod client;

use std::future::Future;

use crate::utils::error::FetchError;

pub use client::HttpFetcher;

/// Source of raw page bodies. Implementations must be safe to share across
/// concurrent section loads.
pub trait PageFetcher {
    /// GETs a fully resolved URL and returns the body of a 2xx response.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

#[cfg(test)]
pub mod testing {
    //! In-memory fetcher for pipeline tests.
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned bodies by URL; unknown URLs answer 404. Records every request.
    #[derive(Debug, Default)]
    pub struct StaticFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Http {
                status: reqwest::StatusCode::NOT_FOUND,
                url: url.to_string(),
            })
        }
    }
}
