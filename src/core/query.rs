use crate::api::models::{QueryPredicate, QuerySegment, TableEntity, TableReference};
use crate::error::ApiError;
use async_trait::async_trait;

/// One bounded segment of a server-side query. Implemented by the storage
/// client; mocked in tests.
#[async_trait]
pub trait SegmentSource<T: TableEntity>: Sync {
    async fn fetch_segment(
        &self,
        table: &TableReference,
        predicate: &QueryPredicate,
        continuation: Option<&str>,
    ) -> Result<QuerySegment<T>, ApiError>;
}

/// Run a query to completion by following continuation tokens, accumulating
/// rows in server-returned order.
///
/// Segment N+1 is never requested before segment N's token is observed.
/// Any mid-loop failure propagates as-is; pagination state is local to this
/// call, so a retried run restarts from the first segment.
pub async fn fetch_all_rows<T, S>(
    source: &S,
    table: &TableReference,
    predicate: &QueryPredicate,
) -> Result<Vec<T>, ApiError>
where
    T: TableEntity,
    S: SegmentSource<T> + ?Sized,
{
    let mut rows = Vec::new();
    let mut continuation: Option<String> = None;

    loop {
        let segment = source
            .fetch_segment(table, predicate, continuation.as_deref())
            .await?;

        rows.extend(segment.rows);
        continuation = segment.continuation;

        if continuation.is_none() {
            log::debug!(
                "Query on '{}' complete: {} rows accumulated",
                table.name(),
                rows.len()
            );
            return Ok(rows);
        }
    }
}
