/// Read-through caching on top of [`Cache`](crate::db::Cache).
///
/// Returns the cached value when present. Otherwise awaits `$block`, hands the
/// result to the background writer, and returns it. A failing cache read is
/// logged and treated as a miss so that a Redis outage never fails the request.
///
/// # Arguments
/// * `$cache`: cache with `get_from_cache` and `set_in_background`.
/// * `$key`: the [`CacheKey`](crate::db::CacheKey) to read and write.
/// * `$ttl`: time-to-live in seconds.
/// * `$block`: future computing the value on a miss; its error is propagated with `?`.
///
/// # Example
/// ```rust,ignore
/// let detail: RecipeDetail = cached!(cache, CacheKey::RecipeDetail(slug.into()), 86400, async {
///     provider.fetch_recipe_detail(slug).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match $cache.get_from_cache(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                None
            }
        };

        match hit {
            Some(cached) => cached,
            None => {
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                value
            }
        }
    }};
}
