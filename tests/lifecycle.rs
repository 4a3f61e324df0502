//! Orchestrator integration tests over in-memory adapters.
//!
//! - `run_tests`: first runs, failures and request validation
//! - `continuation_tests`: follow-ups, reconnection and re-provisioning
//! - `interruption_tests`: stop requests and the watchdog

mod lifecycle {
    pub mod helpers;

    mod continuation_tests;
    mod interruption_tests;
    mod run_tests;
}
