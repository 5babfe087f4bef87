//! Logging setup for the command-line front end

/// Initialize the logger. INFO by default; RUST_LOG overrides the level.
/// Lines carry a timestamp, the level and the emitting module.
pub fn init_logger() {
    init_logger_with_level(log::LevelFilter::Info);
}

/// As [`init_logger`] with a different default level, e.g. from `-v`
pub fn init_logger_with_level(level: log::LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {:5} {}] {}",
                buf.timestamp(),
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        })
        .try_init();
}
