use anyhow::Result;
use quickcalc_core::{AppError, Config, ConfigError};

mod app;
mod commands;
mod weather_service;

fn main() -> Result<()> {
    quickcalc_core::init()?;

    let (config, _) = match Config::load_validated() {
        Ok(loaded) => loaded,
        Err(e) => return Err(report_config_error(e)),
    };
    let mut app = app::App::new(config)?;

    tracing::info!("QuickCalc started");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    app.run(stdin.lock(), stdout.lock())?;

    app.shutdown();
    Ok(())
}

/// Log the user-facing message for a config failure and hand the error back.
fn report_config_error(e: anyhow::Error) -> anyhow::Error {
    match e.downcast::<ConfigError>() {
        Ok(config_err) => {
            let app_err = AppError::from(config_err);
            tracing::error!("{}", app_err.user_message());
            app_err.into()
        }
        Err(other) => other,
    }
}
