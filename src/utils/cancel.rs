use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Races `fut` against `token`; a cancelled view never sees the response.
pub async fn run_cancellable<T, F>(token: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if token.is_cancelled() {
        return Err(Error::Cancelled);
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Error::Cancelled),
        res = fut => res,
    }
}
