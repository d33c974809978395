//! Test suites for the server bootstrap, patch endpoint, and lifecycle.

mod support;
