use log::LevelFilter;

/// Environment variable that turns on debug logging in the binaries.
pub const DEBUG_ENV_VAR: &str = "LEXIQ_DEBUG";

/// Initialize logging for lexiq's binaries.
///
/// `debug_enabled` picks `Debug` over `Info`; an explicit `RUST_LOG` overrides
/// both. Calling this more than once is harmless: later calls are ignored.
pub fn init_logger(debug_enabled: bool) {
    let level = if debug_enabled { LevelFilter::Debug } else { LevelFilter::Info };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    if builder.try_init().is_ok() {
        log::debug!("logger initialized at {level:?} level");
    }
}

/// Whether [`DEBUG_ENV_VAR`] is set to something truthy.
#[must_use]
pub fn debug_from_env() -> bool {
    std::env::var(DEBUG_ENV_VAR).is_ok_and(|v| matches!(v.trim(), "1" | "true" | "yes" | "on"))
}
