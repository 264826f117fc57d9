use futures::future::join_all;
use std::future::Future;

use crate::error::Result;

/// Run independent read-only queries concurrently.
///
/// Every future is awaited; results come back in issue order no matter which
/// completed first. The first error in issue order is returned.
pub async fn gather_positional<T, F>(queries: impl IntoIterator<Item = F>) -> Result<Vec<T>>
where
    F: Future<Output = Result<T>>,
{
    join_all(queries).await.into_iter().collect()
}
