//! Console output.

/// Initialises `env_logger`; `verbose` lowers the level from Info to Debug.
pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();
}

/// Prints a step heading, tagged with the environment when one is selected.
pub fn title(env_name: &str, message: &str) {
    println!("{}", format_title(env_name, message));
}

fn format_title(env_name: &str, message: &str) -> String {
    if env_name.is_empty() {
        message.to_string()
    } else {
        format!("[ {env_name} ] {message}")
    }
}
