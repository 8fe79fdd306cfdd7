//! Embeds the build identity shown in the startup banner.
//!
//! Sets `GIT_HASH`, `BUILD_TIMESTAMP` (UTC) and `BUILD_PROFILE` for
//! `palette_crawler::build_ident`.

use std::path::Path;
use std::process::Command;

const UNKNOWN: &str = "unknown";

/// Trimmed stdout of a successful git invocation
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={}={}", key, value);
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    if let Some(git_dir) = git(&["rev-parse", "--git-dir"]) {
        let head = Path::new(&git_dir).join("HEAD");
        println!("cargo:rerun-if-changed={}", head.display());
    }

    let revision = git(&["describe", "--always", "--dirty", "--abbrev=8"]);
    emit("GIT_HASH", revision.as_deref().unwrap_or(UNKNOWN));

    let built_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    emit("BUILD_TIMESTAMP", &built_at);

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.to_string());
    emit("BUILD_PROFILE", &profile);
}
