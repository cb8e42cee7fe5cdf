use log::LevelFilter;
use pxl_traits::{PxError, PxResult};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Just a simple struct to hold what was set up for a pxl application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PxlContext {
    pub level: LevelFilter,
}

/// This is a basic setup for a pxl application to get you started.
/// Duplicate and customize as needed when your needs grow.
///
/// verbose: log down to the debug level, one line per frame and per stage.
/// Keep it off in production, the per frame lines are on the hot path.
///
/// Logs go to the terminal (stderr for warnings and errors, stdout for the rest).
pub fn basic_pxl_setup(verbose: bool) -> PxResult<PxlContext> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .set_thread_level(LevelFilter::Debug)
        .set_target_level(LevelFilter::Error)
        .build();
    TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto)
        .map_err(|e| PxError::new_with_cause("Failed to set up the logger", e))?;
    Ok(PxlContext { level })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_only_once() {
        let ctx = basic_pxl_setup(true).unwrap();
        assert_eq!(ctx.level, LevelFilter::Debug);
        assert_eq!(log::max_level(), LevelFilter::Debug);
        // the global logger can only be installed once per process
        assert!(basic_pxl_setup(false).is_err());
    }
}
