use thiserror::Error;

/// Failure surfaced by the engine facade
///
/// Folding, ranking and snapshot parsing cannot fail. The only thing a caller
/// can observe is that the engine's background tasks are gone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("trade engine has shut down")]
    Closed,
}
