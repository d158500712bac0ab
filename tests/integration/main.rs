//! Integration tests driving the library store through its public API

mod store_scenarios;
