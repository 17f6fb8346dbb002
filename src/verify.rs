//! Post-install verification of the toolchain binaries.

use crate::detection::{check_version, parse_version};
use crate::{SetupEnv, SetupError};
use futures::future::join_all;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Binaries that must be usable after setup, in report order.
pub const EXPECTED_BINARIES: [&str; 2] = ["rustc", "cargo"];

/// A verified binary and what it reported about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolVersion {
    /// Executable name (`rustc` or `cargo`).
    pub name: String,

    /// Where the executable was found.
    pub path: PathBuf,

    /// Trimmed `--version` output; empty when the query failed.
    pub raw: String,

    /// Parsed semantic version, when the output contained one.
    pub version: Option<Version>,
}

/// Locate the compiler and build tool and query their versions.
///
/// Both must be on `env`'s search path, otherwise the run fails with
/// [`SetupError::VerificationFailed`] listing every missing name and no
/// version is queried. Version queries run concurrently and are best-effort:
/// a failure leaves `raw` empty instead of failing verification.
pub async fn verify_toolchain(
    env: &SetupEnv,
    version_timeout: Duration,
) -> Result<Vec<ToolVersion>, SetupError> {
    let mut found = Vec::with_capacity(EXPECTED_BINARIES.len());
    let mut missing = Vec::new();
    for name in EXPECTED_BINARIES {
        match env.find_executable(name) {
            Some(path) => found.push((name, path)),
            None => missing.push(name.to_string()),
        }
    }

    if !missing.is_empty() {
        tracing::warn!(?missing, "toolchain binaries not found after install");
        return Err(SetupError::VerificationFailed {
            fix: format!(
                "Check that {} exists and contains {}, then run again",
                env.cargo_bin().display(),
                missing.join(" and ")
            ),
            missing,
        });
    }

    // A search path that cannot be joined was already rejected by the PATH update.
    let vars = env.child_vars().unwrap_or_default();
    let queries = found.into_iter().map(|(name, path)| {
        let vars = &vars;
        async move {
            let raw = match check_version(&path, version_timeout, vars).await {
                Ok(output) => output.trim().to_string(),
                Err(e) => {
                    tracing::warn!(binary = name, error = e.description(), "version query failed");
                    String::new()
                }
            };
            let version = parse_version(&raw).ok();
            ToolVersion {
                name: name.to_string(),
                path,
                raw,
                version,
            }
        }
    });

    Ok(join_all(queries).await)
}
