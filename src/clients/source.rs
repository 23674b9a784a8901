use std::future::Future;

use crate::clients::entities::{DataKind, Record};
use crate::clients::errors::Result;

/// Anything that can hand over a user's complete chart for a data kind.
///
/// Implementations must paginate fully before returning and must return
/// records in a stable order: grouping and tie-breaking depend on it.
pub trait ScrobbleSource {
    fn fetch_all(
        &self,
        username: &str,
        kind: DataKind,
    ) -> impl Future<Output = Result<Vec<Record>>> + Send;
}
