fn main() {
    // Tell cargo to recompile when these compile-time env vars change.
    // Without this, option_env!() values get cached and won't update.
    println!("cargo:rerun-if-env-changed=TALLY_API_ROOT");
    println!("cargo:rerun-if-env-changed=TALLY_WEB_APP_URL");
    println!("cargo:rerun-if-env-changed=TALLY_PARTNER_NAME");
    println!("cargo:rerun-if-env-changed=TALLY_PARTNER_PASSWORD");
}
