use std::path::PathBuf;

use chunkgraph_test_utils::Tester;
use testing_macros::fixture;

#[fixture("./tests/fixtures/**/test.config.json")]
fn test(path: PathBuf) {
  Tester::from_config_path(&path).run()
}
