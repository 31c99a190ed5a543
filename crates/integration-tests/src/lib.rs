//! End-to-end tests for FreshFold.
//!
//! [`backend::FakeBackend`] stands in for the FreshFold REST API with an
//! in-memory store. [`harness::TestEnv`] serves it alongside the real
//! storefront and admin routers on ephemeral ports, and
//! [`harness::Browser`] drives them the way a cookie-keeping browser would.
//!
//! ```bash
//! cargo test -p freshfold-integration-tests
//! ```

pub mod backend;
pub mod harness;
