#[cfg(feature = "line")]
mod line_mode;
#[cfg(feature = "tui")]
mod render_help;
#[cfg(feature = "tui")]
mod tui_mode;

use anyhow::Result;
use sci_calc::config::AppConfig;
use sci_calc::logging;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();
    run(&config)
}

#[cfg(feature = "tui")]
fn run(config: &AppConfig) -> Result<()> {
    logging::init(config.log_file.as_deref(), false)?;
    tui_mode::run_tui(config)
}

#[cfg(all(feature = "line", not(feature = "tui")))]
fn run(config: &AppConfig) -> Result<()> {
    logging::init(config.log_file.as_deref(), true)?;
    line_mode::run_line(config)
}

#[cfg(not(any(feature = "tui", feature = "line")))]
fn run(config: &AppConfig) -> Result<()> {
    logging::init(config.log_file.as_deref(), true)?;
    anyhow::bail!("built without a front end; enable the `tui` or `line` feature")
}
