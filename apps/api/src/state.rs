use std::sync::Arc;

use crate::dialogue::StageController;
use crate::extraction::DocumentExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the session store and the model client.
    pub controller: Arc<StageController>,
    /// Document-to-text for uploads. OCR fallback is optional (OCR_ENABLED).
    pub documents: DocumentExtractor,
}
