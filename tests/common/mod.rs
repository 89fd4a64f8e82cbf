// Common test utilities and fixture loading

#![allow(dead_code)]

use kindle::pipeline::{Error, Pipeline};
use kindle::runtime::VmBcConfig;
use std::fs;
use std::path::PathBuf;

/// Load a test fixture file by name
pub fn load_fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{}.kd", name));

    fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", path.display()))
}

/// Run source and return everything it printed, or the first error.
pub fn run(source: &str) -> Result<String, Error> {
    run_with_config(source, VmBcConfig::default())
}

pub fn run_with_config(source: &str, config: VmBcConfig) -> Result<String, Error> {
    let mut out = Vec::new();
    Pipeline::new(source).run_to(&mut out, config)?;
    Ok(String::from_utf8(out).expect("output is ASCII digits"))
}

/// Assert that a program runs and prints exactly `expected`
pub fn assert_program_output(source: &str, expected: &str) {
    match run(source) {
        Ok(out) => assert_eq!(out, expected, "output mismatch for:\n{}", source),
        Err(e) => panic!("program failed: {}\nsource:\n{}", e, source),
    }
}

/// Assert that a program fails and return the error
pub fn expect_error(source: &str) -> Error {
    match run(source) {
        Ok(out) => panic!("expected an error, program printed {:?}", out),
        Err(e) => e,
    }
}
