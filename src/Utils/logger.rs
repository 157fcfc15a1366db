use simplelog::{ColorChoice, Config, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

/// Installs a terminal logger at `level`. Returns `false` when a logger is already set.
pub fn init_logger(level: LevelFilter) -> bool {
    TermLogger::init(level, logger_config(), TerminalMode::Mixed, ColorChoice::Auto).is_ok()
}

fn logger_config() -> Config {
    ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Debug)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        // the first call may already have happened in another test of this binary
        let _ = init_logger(LevelFilter::Warn);
        assert!(!init_logger(LevelFilter::Warn));
    }
}
