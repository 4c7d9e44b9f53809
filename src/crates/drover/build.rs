use std::process::Command;

fn main() {
    println!("cargo:rustc-env=DROVER_GIT_COMMIT={}", commit_hash());
    println!(
        "cargo:rustc-env=DROVER_BUILD_TIME={}",
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );

    // Re-stamp when the checked-out commit moves.
    println!("cargo:rerun-if-changed=../../../.git/HEAD");
}

// Short hash of HEAD; "unknown" when the build runs outside a checkout.
fn commit_hash() -> String {
    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
