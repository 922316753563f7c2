//! Bakes the backend base URL into the web build, since a browser bundle has
//! no process environment to read at runtime.

const API_BASE_VAR: &str = "COLD_MAILER_API_BASE";

fn main() {
    // Load .env if present (searched from this crate up to the workspace root)
    if let Ok(path) = dotenvy::dotenv() {
        println!("cargo:rerun-if-changed={}", path.display());
    }
    println!("cargo:rerun-if-env-changed={API_BASE_VAR}");

    if let Ok(base) = std::env::var(API_BASE_VAR) {
        println!("cargo:rustc-env={API_BASE_VAR}={base}");
    }
}
