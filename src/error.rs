use thiserror::Error;

/// Errors raised at the engine boundary.
///
/// Grammar expansion, interpretation and playback never fail; malformed input
/// is coerced instead. Only construction and JSON parsing can report errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine built without a preset catalog")]
    MissingCatalog,
    #[error("invalid preset catalog: {0}")]
    Catalog(#[source] serde_json::Error),
    #[error("invalid settings snapshot: {0}")]
    Snapshot(#[source] serde_json::Error),
}
