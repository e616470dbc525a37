//! SeaORM entity definitions for the PostgreSQL database.

pub mod attachment;
pub mod client;
pub mod device;
pub mod execution;
pub mod project;
pub mod resolution;
pub mod run;
pub mod scenario;
pub mod status;
pub mod status_set;
pub mod suitcase;
pub mod test_case;
pub mod test_case_version;
pub mod test_suite;
pub mod tester;
pub mod tester_group;
pub mod tester_type;
