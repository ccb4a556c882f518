//! Shared helpers for description fixtures

use std::fs;
use std::path::PathBuf;

/// Raw description XML read from `tests/fixtures`
pub fn load_fixture(filename: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(filename);

    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", filename, e))
}

/// Description URL a mock server serves for `path`
pub fn location_url(server: &mockito::ServerGuard, path: &str) -> String {
    format!("{}{}", server.url(), path)
}
