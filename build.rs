#![forbid(unsafe_code)]

// Build information reported by the version endpoint and logged at startup.
// Values that can't be determined (e.g. building outside a git checkout) are
// left unset and reported as "unknown" at runtime.
fn main() {
    if let Ok(branch) = build_data::get_git_branch() {
        println!("cargo:rustc-env=GIT_BRANCH={}", branch);
    }
    if let Ok(commit) = build_data::get_git_commit_short() {
        println!("cargo:rustc-env=GIT_COMMIT_SHORT={}", commit);
    }
    if let Ok(dirty) = build_data::get_git_dirty() {
        println!("cargo:rustc-env=GIT_DIRTY={}", dirty);
    }
    // Using the build time would make builds unreproducible.
    if let Ok(ts) = build_data::get_source_time() {
        println!("cargo:rustc-env=SOURCE_TIMESTAMP={}", build_data::format_timestamp(ts));
    }
    if let Ok(rustc) = build_data::get_rustc_version() {
        println!("cargo:rustc-env=RUSTC_VERSION={}", rustc);
    }
}
