/// A macro to simplify read-through caching.
///
/// This macro checks if a value is present in the cache.
/// If found, it returns the cached value.
/// If not found, it executes the provided block to compute the value,
/// stores it in the cache, and then returns the computed value.
///
/// # Arguments
/// * `$cache`: The `TtlCache` instance to use for retrieval and storage.
/// * `$key`: The `CacheKey` to use for caching the value.
/// * `$ttl`: `Option<Duration>` time-to-live; `None` uses the cache default.
/// * `$block`: The block of code to execute if the value is not found in cache.
///
/// # Example
/// ```rust,ignore
/// let catalog: Vec<Content> = cached!(cache, CacheKey::Catalog, None, async {
///     store.list_content().await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        // Attempt to get the value from cache
        if let Some(cached) = $cache.get(&$key).await? {
            Ok(cached)
        } else {
            // If not in cache, execute the block to compute the value
            let value = $block.await?;
            // Store the computed value in cache
            $cache.set(&$key, &value, $ttl).await?;
            Ok(value)
        }
    }};
}
