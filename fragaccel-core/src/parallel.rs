//! Optional cap on the rayon global thread pool, honoring `THREADS`.

use std::sync::OnceLock;

static POOL: OnceLock<Option<rayon::ThreadPool>> = OnceLock::new();

fn threads_from_env() -> Option<usize> {
    std::env::var("THREADS").ok()?.parse::<usize>().ok()
}

/// Builds (once) a rayon thread pool sized by `THREADS`, if set and valid.
/// Returns `None` when `THREADS` is absent or unparsable, meaning callers
/// should just use rayon's default global pool.
fn pool() -> Option<&'static rayon::ThreadPool> {
    POOL.get_or_init(|| {
        threads_from_env().and_then(|n| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .ok()
        })
    })
    .as_ref()
}

/// Runs `f` on the `THREADS`-capped pool if one was configured, else on
/// rayon's default global pool.
pub fn install<R: Send>(f: impl FnOnce() -> R + Send) -> R {
    match pool() {
        Some(p) => p.install(f),
        None => f(),
    }
}
