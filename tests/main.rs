/*!
 * Main test entry point for potwai test suite
 */

// Import common test utilities
pub mod common;

// Import unit tests
mod unit {
    // Catalog parsing and writing
    pub mod catalog_tests;

    // Placeholder validation
    pub mod placeholder_tests;

    // App configuration tests
    pub mod app_config_tests;

    // Provider implementation tests
    pub mod providers_tests;
}

// Import integration tests
mod integration {
    // Pipeline runs with the mock provider
    pub mod translation_pipeline_tests;

    // Full app lifecycle tests
    pub mod app_lifecycle_tests;
}
