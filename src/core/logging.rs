//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable.
///
/// # Example
/// ```
/// grove::core::logging::init();
/// log::info!("Garden started");
/// ```
pub fn init() {
    // try_init so repeated calls (tests, embedding hosts) are harmless
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}
