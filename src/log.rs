use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

pub fn init(verbose: bool) -> Result<(), SetLoggerError> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    TermLogger::init(
        level,
        ConfigBuilder::new()
            .add_filter_allow_str("weatherbot")
            .build(),
        TerminalMode::Stdout,
        ColorChoice::Auto,
    )
}
