use log::LevelFilter;

/// Installs a plain console logger. Meant for binaries and test harnesses;
/// library users that already run a logger should skip this. Errors if a
/// global logger is installed twice.
pub fn init_logging(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()
}
