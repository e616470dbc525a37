//! API endpoint modules.

pub mod attachments;
pub mod auth;
pub mod catalog;
pub mod executions;
pub mod health;
pub mod openapi;
pub mod runs;
pub mod statuses;
pub mod test_cases;
pub mod test_suites;
pub mod testers;

pub use attachments::configure_routes as configure_attachment_routes;
pub use auth::configure_routes as configure_auth_routes;
pub use catalog::configure_routes as configure_catalog_routes;
pub use executions::configure_routes as configure_execution_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use runs::configure_routes as configure_run_routes;
pub use statuses::configure_routes as configure_status_routes;
pub use test_cases::configure_routes as configure_test_case_routes;
pub use test_suites::configure_routes as configure_test_suite_routes;
pub use testers::configure_routes as configure_tester_routes;
