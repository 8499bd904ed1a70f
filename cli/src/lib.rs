pub mod callbacks;
pub mod commands;
pub mod mobs;
pub mod output;
pub mod speech;

use std::io::Write;

use tracing_subscriber::EnvFilter;

/// Prompt and read one line from stdin. An empty string means end of input.
pub fn readline() -> Result<String, String> {
    write!(std::io::stdout(), "> ").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())?;
    let mut buffer = String::new();
    std::io::stdin()
        .read_line(&mut buffer)
        .map_err(|e| e.to_string())?;
    Ok(buffer)
}

/// Log filter from `RUST_LOG`-style directives, defaulting to info.
/// Unparseable directives are skipped.
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .parse_lossy(directives.unwrap_or_default())
}
