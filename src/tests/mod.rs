// Test modules for natdev
// Each module holds the unit tests for the corresponding source module

mod gateway_tests;
mod protocol_tests;
