//! Integration test harness over the in-memory backends.
//!
//! These tests exercise the full reconciliation path (reconciler,
//! materializer, cached listings) with the in-memory store, cache and
//! repositories, so they run without PostgreSQL or Redis.

mod helpers;

mod hierarchy_test;
mod template_test;
