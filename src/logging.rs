//! Logging setup, in the teacher's `log` + `fern` style
//! (see the original `logging::setup_logging(logging::Info)` call site).

pub use log::LevelFilter::{Debug, Error, Info, Trace, Warn};

/// Installs a process-wide `fern` dispatcher writing to stdout.
///
/// Combat hit-by-hit detail is logged at `trace` so a normal session at
/// `info` or `debug` is not flooded; resets, invariant violations, and tick
/// timing are logged at `info`/`warn`/`error`.
pub fn setup_logging(level: log::LevelFilter) -> Result<(), fern::InitError> {
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
        .apply()?;
    Ok(())
}
