//! Build script for astromatch-web
//!
//! Stamps the binary with the source revision, build time and profile
//! printed in the startup banner. `ASTROMATCH_REVISION` takes the place of
//! git when building outside a checkout, e.g. from a source archive.

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_string())
}

fn source_revision() -> String {
    if let Ok(revision) = std::env::var("ASTROMATCH_REVISION") {
        if !revision.trim().is_empty() {
            return revision.trim().to_string();
        }
    }

    match git(&["rev-parse", "--short=8", "HEAD"]).filter(|hash| !hash.is_empty()) {
        Some(hash) => {
            let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
                .is_some_and(|changes| !changes.is_empty());
            if dirty {
                format!("{}-dirty", hash)
            } else {
                hash
            }
        }
        None => "unknown".to_string(),
    }
}

fn main() {
    let built_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    // No rerun-if directives: the stamp is refreshed on every build
    println!("cargo:rustc-env=GIT_HASH={}", source_revision());
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", built_at);
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);
}
