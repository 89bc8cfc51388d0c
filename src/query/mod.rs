//! Query caching, de-duplication, and invalidation.
//!
//! This module provides the orchestration layer between resource clients and
//! the transport:
//! - Derives deterministic cache keys from resource path + parameters
//! - Serves fresh cached values without touching the network
//! - Collapses concurrent identical reads into one in-flight call
//! - Invalidates resource families by path prefix after mutations

mod cache;
mod client;
mod key;

pub use cache::{CacheEntry, CacheStore};
pub use client::{FetchFuture, MutationRecord, QueryClient};
pub use key::QueryKey;
