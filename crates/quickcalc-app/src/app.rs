use std::io::{BufRead, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use quickcalc_calc::{Calculator, QuickCalcDialog, QuickCalcKind};
use quickcalc_core::{AppError, Config, WeatherError};
use quickcalc_weather::{WeatherPanel, WeatherProvider};

use crate::commands::{Command, HELP};
use crate::weather_service::{self, WeatherServiceMessage};

/// Extra time allowed past the HTTP timeout before giving up on a reply.
const LOOKUP_GRACE: Duration = Duration::from_secs(2);

/// Whether the input loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Application state and lifecycle: calculator, quick-calc dialog and
/// weather panel, plus the runtime weather lookups run on.
pub struct App {
    calculator: Calculator,
    dialog: QuickCalcDialog,
    panel: WeatherPanel,
    provider: Option<Arc<WeatherProvider>>,
    runtime: tokio::runtime::Runtime,
    tx: Sender<WeatherServiceMessage>,
    rx: Receiver<WeatherServiceMessage>,
    lookup_wait: Duration,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .thread_name("quickcalc-tokio")
            .build()
            .context("Failed to create tokio runtime")?;

        let provider = match WeatherProvider::new(&config.weather) {
            Ok(p) => Some(Arc::new(p)),
            Err(e) => {
                tracing::error!("Weather lookups disabled: {}", e);
                None
            }
        };

        let calculator: Calculator =
            Calculator::default().with_fraction_digits(config.calculator.fraction_digits);
        let (tx, rx) = std::sync::mpsc::channel();

        tracing::info!(
            "Application initialized (weather {})",
            if config.weather.is_configured() {
                "configured"
            } else {
                "not configured"
            }
        );

        Ok(Self {
            calculator,
            dialog: QuickCalcDialog::new(),
            panel: WeatherPanel::new(),
            provider,
            runtime,
            tx,
            rx,
            lookup_wait: Duration::from_secs(config.weather.request_timeout_secs) + LOOKUP_GRACE,
        })
    }

    /// Read lines until end of input or `:quit`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> Result<()> {
        writeln!(out, "QuickCalc  (:help for commands)")?;
        self.render_calculator(&mut out)?;

        for line in input.lines() {
            let line = line.context("Failed to read input")?;
            if self.handle_line(&line, &mut out)? == Flow::Quit {
                break;
            }
            out.flush()?;
        }

        Ok(())
    }

    /// Process one line of input and write the resulting view.
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        self.drain_weather_messages();

        match Command::parse(line) {
            Command::Empty => {}
            Command::Keys(keys) => {
                if let Some(kind) = self.dialog.kind() {
                    writeln!(out, "{} is open; finish it or :cancel", kind.title())?;
                    return Ok(Flow::Continue);
                }
                self.calculator.press_all(keys);
                self.render_calculator(out)?;
            }
            Command::Quick { kind, args } => self.quick_calc(kind, &args, out)?,
            Command::Cancel => {
                if self.dialog.is_open() {
                    self.dialog.cancel(&mut self.calculator);
                }
                self.render_calculator(out)?;
            }
            Command::Weather(city) => self.search_weather(city, out)?,
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
            Command::Unknown(text) => writeln!(out, "Unrecognized input: {}", text)?,
        }

        Ok(Flow::Continue)
    }

    fn quick_calc<W: Write>(&mut self, kind: QuickCalcKind, args: &[String], out: &mut W) -> Result<()> {
        if self.dialog.kind() != Some(kind) {
            self.dialog.open(kind);
        }
        for (field, value) in kind.fields().iter().zip(args) {
            self.dialog.set_input(*field, value.as_str());
        }

        if self.dialog.calculate(&mut self.calculator) {
            self.render_calculator(out)?;
        } else {
            let labels: Vec<_> = kind.fields().iter().map(|f| f.label()).collect();
            writeln!(out, "{}: enter {}", kind.title(), labels.join(", "))?;
            writeln!(out, "(dialog still open, :cancel to close)")?;
        }
        Ok(())
    }

    fn search_weather<W: Write>(&mut self, city: String, out: &mut W) -> Result<()> {
        let Some(provider) = self.provider.clone() else {
            let err = AppError::Weather(WeatherError::ServiceUnavailable);
            writeln!(out, "{}", err.user_message())?;
            return Ok(());
        };

        self.panel.set_city(city);
        let Some(ticket) = self.panel.submit() else {
            if self.panel.is_loading() {
                writeln!(out, "Search already in progress")?;
            }
            return Ok(());
        };

        writeln!(out, "Loading...")?;
        out.flush()?;
        weather_service::request_lookup(&self.tx, self.runtime.handle(), provider, ticket);

        match self.rx.recv_timeout(self.lookup_wait) {
            Ok(msg) => self.apply_weather_message(msg),
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!("Weather lookup still pending after {:?}", self.lookup_wait);
            }
            Err(RecvTimeoutError::Disconnected) => {
                tracing::error!("Weather service channel closed");
            }
        }

        self.render_weather(out)
    }

    fn drain_weather_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.apply_weather_message(msg);
        }
    }

    fn apply_weather_message(&mut self, msg: WeatherServiceMessage) {
        match msg {
            WeatherServiceMessage::LookupDone(ticket, result) => {
                self.panel.complete(&ticket, result);
            }
        }
    }

    fn render_calculator<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "[ {} ]", self.calculator.display())?;
        if !self.calculator.equation().is_empty() {
            writeln!(out, "  {}", self.calculator.equation())?;
        }
        Ok(())
    }

    fn render_weather<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.panel.is_loading() {
            writeln!(out, "Loading...")?;
        }
        if let Some(error) = self.panel.error() {
            writeln!(out, "{}", error)?;
        }
        if let Some(report) = self.panel.visible_report() {
            if report.country.is_empty() {
                writeln!(out, "{}", report.name)?;
            } else {
                writeln!(out, "{}, {}", report.name, report.country)?;
            }
            writeln!(out, "  {}  {}", report.temperature_label(), report.description)?;
            writeln!(out, "  {}", report.humidity_label())?;
            let icon = report.icon_url();
            if !icon.is_empty() {
                writeln!(out, "  {}", icon)?;
            }
        }
        Ok(())
    }

    /// Shutdown the runtime, abandoning any lookup still in flight
    pub fn shutdown(self) {
        tracing::info!("Shutting down application");
        self.runtime.shutdown_timeout(Duration::from_secs(1));
    }

    #[cfg(test)]
    fn calculator(&self) -> &Calculator {
        &self.calculator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(Config::default()).unwrap()
    }

    fn feed(app: &mut App, lines: &[&str]) -> String {
        let mut out = Vec::new();
        for line in lines {
            app.handle_line(line, &mut out).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn keypad_lines_drive_calculator() {
        let mut app = app();
        let out = feed(&mut app, &["2+3", "="]);
        assert_eq!(app.calculator().display(), "5");
        assert!(out.contains("[ 5 ]"));
    }

    #[test]
    fn quick_calc_writes_result() {
        let mut app = app();
        let out = feed(&mut app, &[":tip 100 15"]);
        assert!(out.contains("[ 115.00 ]"));
        assert_eq!(app.calculator().equation(), "100 + (100 × 15%)");
    }

    #[test]
    fn invalid_quick_calc_blocks_keypad_until_cancel() {
        let mut app = app();
        feed(&mut app, &["12"]);
        let out = feed(&mut app, &[":bmi seventy 175", "3"]);
        assert!(out.contains("dialog still open"));
        assert!(out.contains("Calculate BMI is open"));
        assert_eq!(app.calculator().display(), "12");

        feed(&mut app, &[":cancel"]);
        assert!(app.calculator().state().is_initial());
    }

    #[test]
    fn quick_calc_retry_fixes_inputs() {
        let mut app = app();
        feed(&mut app, &[":bmi x 175"]);
        let out = feed(&mut app, &[":bmi 70 175"]);
        assert!(out.contains("[ 22.9 ]"));
    }

    #[test]
    fn weather_without_key_shows_error() {
        let mut app = app();
        let out = feed(&mut app, &[":weather London"]);
        assert!(out.contains("Loading..."));
        assert!(out.contains("Weather API key is not configured"));
        assert!(!app.panel.is_loading());
    }

    #[test]
    fn blank_weather_search_is_ignored() {
        let mut app = app();
        let out = feed(&mut app, &[":weather"]);
        assert!(out.is_empty());
    }

    #[test]
    fn unknown_input_reported() {
        let mut app = app();
        let out = feed(&mut app, &["2%"]);
        assert!(out.contains("Unrecognized input: %"));
    }

    #[test]
    fn quit_stops_loop() {
        let mut app = app();
        let input = std::io::Cursor::new("1+1=\n:quit\n9\n");
        let mut out = Vec::new();
        app.run(input, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[ 2 ]"));
        assert!(!text.contains("[ 9 ]"));
    }
}
