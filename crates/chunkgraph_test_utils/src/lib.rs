mod fixture_module;
pub use fixture_module::*;
mod test_config;
pub use test_config::*;
mod tester;
pub use tester::*;
