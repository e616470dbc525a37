//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Testdesk Server",
        version = "0.4.0",
        description = "API server for managing test cases, suites, runs, and executions"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Auth endpoints
        api::auth::register,
        api::auth::login,
        api::auth::me,
        // Catalog endpoints
        api::catalog::list_clients,
        api::catalog::get_client,
        api::catalog::create_client,
        api::catalog::update_client,
        api::catalog::list_projects,
        api::catalog::get_project,
        api::catalog::create_project,
        api::catalog::update_project,
        api::catalog::list_devices,
        api::catalog::get_device,
        api::catalog::create_device,
        api::catalog::update_device,
        api::catalog::list_resolutions,
        api::catalog::get_resolution,
        api::catalog::create_resolution,
        api::catalog::list_scenarios,
        api::catalog::get_scenario,
        api::catalog::create_scenario,
        api::catalog::update_scenario,
        // Status endpoints
        api::statuses::list_status_sets,
        api::statuses::get_status_set,
        api::statuses::create_status_set,
        api::statuses::update_status_set,
        api::statuses::list_statuses,
        api::statuses::get_status,
        api::statuses::create_status,
        api::statuses::update_status,
        // Tester endpoints
        api::testers::list_testers,
        api::testers::get_tester,
        api::testers::create_tester,
        api::testers::update_tester,
        api::testers::list_tester_types,
        api::testers::get_tester_type,
        api::testers::create_tester_type,
        api::testers::update_tester_type,
        api::testers::list_tester_groups,
        api::testers::get_tester_group,
        api::testers::create_tester_group,
        api::testers::update_tester_group,
        // Test case endpoints
        api::test_cases::list_test_cases,
        api::test_cases::get_test_case,
        api::test_cases::create_test_case,
        api::test_cases::update_test_case,
        api::test_cases::get_case_versions,
        api::test_cases::create_version_from_latest,
        api::test_cases::list_versions,
        api::test_cases::get_version,
        api::test_cases::create_version,
        api::test_cases::update_version,
        // Test suite endpoints
        api::test_suites::list_test_suites,
        api::test_suites::get_test_suite,
        api::test_suites::create_test_suite,
        api::test_suites::update_test_suite,
        api::test_suites::get_suite_members,
        api::test_suites::list_suitcases,
        api::test_suites::create_suitcase,
        api::test_suites::delete_suitcase,
        // Run endpoints
        api::runs::list_runs,
        api::runs::get_run,
        api::runs::create_run,
        api::runs::update_run,
        api::runs::get_run_executions,
        api::runs::get_run_stats,
        // Execution endpoints
        api::executions::list_executions,
        api::executions::get_execution,
        api::executions::create_execution,
        api::executions::update_execution,
        api::executions::bulk_create_from_test_suite,
        api::executions::transition_status,
        api::executions::reassign_device,
        api::executions::reassign_tester,
        api::executions::get_execution_stats,
        // Attachment endpoints
        api::attachments::upload_attachment,
        api::attachments::list_attachments,
        api::attachments::get_attachment,
        api::attachments::update_attachment,
        api::attachments::get_attachment_children,
        api::attachments::download_attachment,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            models::StatusRole,
            models::ExecutionStats,
            models::RunStats,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Auth
            api::auth::RegisterRequest,
            api::auth::LoginRequest,
            api::auth::TokenResponse,
            api::auth::MeResponse,
            // Catalog
            api::catalog::ClientResponse,
            api::catalog::ProjectResponse,
            api::catalog::DeviceResponse,
            api::catalog::ResolutionResponse,
            api::catalog::ScenarioResponse,
            // Statuses
            api::statuses::StatusSetResponse,
            api::statuses::StatusResponse,
            // Testers
            api::testers::TesterResponse,
            api::testers::TesterTypeResponse,
            api::testers::TesterGroupResponse,
            // Test cases
            api::test_cases::TestCaseResponse,
            api::test_cases::TestCaseVersionResponse,
            // Test suites
            api::test_suites::TestSuiteResponse,
            api::test_suites::SuitcaseResponse,
            api::test_suites::SuiteMemberResponse,
            // Runs
            api::runs::RunResponse,
            // Executions
            api::executions::ExecutionResponse,
            // Attachments
            api::attachments::AttachmentResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Auth", description = "Registration, login, and identity"),
        (name = "Catalog", description = "Clients, projects, devices, resolutions, scenarios"),
        (name = "Statuses", description = "Status sets and statuses"),
        (name = "Testers", description = "Testers, types, and groups"),
        (name = "Test Cases", description = "Test cases and their versions"),
        (name = "Test Suites", description = "Suites and membership"),
        (name = "Runs", description = "Execution campaigns"),
        (name = "Executions", description = "Executions and bulk materialization"),
        (name = "Attachments", description = "Attachment metadata and bytes"),
    )
)]
pub struct ApiDoc;
