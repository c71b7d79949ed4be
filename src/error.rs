/// Errors reported when constructing a cache.
///
/// Runtime operations never fail: a miss, a declined loader or a rejected
/// push is reported as `None` or `false` instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	/// The cache was configured to hold no rows.
	#[error("cache capacity must be at least one row")]
	ZeroCapacity,
}
