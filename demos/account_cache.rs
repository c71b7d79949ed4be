//! Caches account records loaded from a slow backing store.
//!
//! Run with `RUST_LOG=heaped_cache=trace cargo run --example account_cache`
//! to see construction and eviction events.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use heaped_cache::CacheBuilder;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct Account {
	id: u64,
	name: String,
}

/// Stand-in for a database lookup. Account 0 does not exist.
fn load_account(id: &u64) -> Option<Account> {
	thread::sleep(Duration::from_micros(200));
	(*id != 0).then(|| Account {
		id: *id,
		name: format!("account {id}"),
	})
}

fn main() {
	tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

	let cache = Arc::new(CacheBuilder::new(64).tolerance(8).build::<u64, Account>());

	let workers: Vec<_> = (0..4u64)
		.map(|worker| {
			let cache = cache.clone();
			thread::spawn(move || {
				let mut found = 0;
				for i in 0..200u64 {
					// Overlapping key ranges: workers share most lookups
					let id = (worker * 16 + i) % 96;
					if cache.get_or_push(id, load_account).is_some() {
						found += 1;
					}
				}
				found
			})
		})
		.collect();

	for (worker, handle) in workers.into_iter().enumerate() {
		let found = handle.join().expect("worker should not panic");
		info!(worker, found, "worker finished");
	}

	info!(
		len = cache.len(),
		capacity = cache.capacity(),
		oldest = ?cache.peek_oldest(),
		"cache state"
	);

	while let Some(account) = cache.pop() {
		if account.id % 16 == 0 {
			info!(id = account.id, name = %account.name, "drained");
		}
	}
}
