use std::sync::Arc;
use crate::middleware::auth::JwtVerifier;
use crate::services::ingest::IngestService;

#[derive(Clone)]
pub struct AppState {
    pub ingest: Arc<IngestService>,
    pub verifier: Arc<JwtVerifier>,
}

impl AppState {
    pub fn new(ingest: IngestService, verifier: JwtVerifier) -> Self {
        Self {
            ingest: Arc::new(ingest),
            verifier: Arc::new(verifier),
        }
    }
}
