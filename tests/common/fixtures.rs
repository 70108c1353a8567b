use std::path::{Path, PathBuf};

pub const GENESIS_FIXTURE: &str = "tests/fixtures/genesis-1-1-10.txt";
pub const AMAZING_GRACE_FIXTURE: &str = "tests/fixtures/amazing-grace.txt";

pub fn fixture_path(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(rel)
}

pub fn load_fixture(rel: &str) -> String {
    let path = fixture_path(rel);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {}", path.display(), e))
}

pub fn genesis() -> String {
    load_fixture(GENESIS_FIXTURE)
}

pub fn amazing_grace() -> String {
    load_fixture(AMAZING_GRACE_FIXTURE)
}
