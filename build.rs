use rustc_version::version;

// Exposes the compiler version to the crate, it ends up as a label on the
// rctl_exporter_build metric.
fn main() {
    let rustc = version()
        .map(|v| v.to_string())
        .unwrap_or_else(|_| "unknown".to_owned());

    println!("cargo:rustc-env=RUSTC_VERSION={rustc}");
    println!("cargo:rerun-if-changed=build.rs");
}
