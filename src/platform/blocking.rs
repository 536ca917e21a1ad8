use crate::usecase::ports::store::StorageError;

/// Runs a synchronous storage call on the blocking pool so the async caller
/// is not stalled while SQLite works.
pub async fn run_blocking<F, T>(f: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| StorageError::Message(format!("storage task failed: {err}")))?
}
