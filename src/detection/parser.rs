//! Version output parsing with regex extraction.

use super::DetectionError;
use regex::Regex;
use semver::Version;

/// Parse a semantic version from CLI output.
///
/// Handles the formats the toolchain binaries print:
///
/// - `rustc 1.83.0 (90b35a623 2024-11-26)` -> 1.83.0
/// - `cargo 1.83.0 (5ffbef321 2024-10-29)` -> 1.83.0
/// - `rustc 1.85.0-nightly (a2545fd6f 2024-11-26)` -> 1.85.0-nightly
pub(crate) fn parse_version(output: &str) -> Result<Version, DetectionError> {
    let re = Regex::new(r"(\d+)\.(\d+)\.(\d+)(-[0-9A-Za-z.-]+)?").expect("Invalid regex pattern");

    if let Some(caps) = re.captures(output) {
        let version_str = caps.get(0).expect("Capture group 0 should exist").as_str();
        Version::parse(version_str).map_err(|_| DetectionError::VersionParseFailed)
    } else {
        Err(DetectionError::VersionParseFailed)
    }
}
