//! Evaluator tests
//!
//! HTTP and version probes run against `wiremock` servers; metric checks use
//! a canned query layer.
