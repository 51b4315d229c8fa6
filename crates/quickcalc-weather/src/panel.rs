//! Weather panel state: search box, in-flight lookup, error and last report.
//!
//! Only one search can be submitted at a time. Completions are applied
//! unconditionally, even if a newer ticket has been issued since; a late
//! response for an older search overwrites the panel and is logged.

use crate::types::{LookupError, WeatherReport};

/// Lookup operation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupState {
    #[default]
    Idle,
    Busy { seq: u64 },
}

impl LookupState {
    /// True if a new search can be submitted.
    pub fn can_submit(self) -> bool {
        matches!(self, LookupState::Idle)
    }

    /// State after a lookup finished.
    pub fn on_lookup_done(self) -> Self {
        LookupState::Idle
    }
}

/// Handle for one submitted search. Pass it back to [`WeatherPanel::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub seq: u64,
    pub city: String,
}

#[derive(Debug, Default)]
pub struct WeatherPanel {
    city: String,
    state: LookupState,
    error: Option<String>,
    report: Option<WeatherReport>,
    last_seq: u64,
}

impl WeatherPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the search box text.
    pub fn set_city(&mut self, city: impl Into<String>) {
        self.city = city.into();
    }

    /// Start a search for the current city text.
    ///
    /// Returns `None` when the text is blank or a lookup is already loading.
    pub fn submit(&mut self) -> Option<LookupTicket> {
        if !self.state.can_submit() {
            tracing::debug!("Search ignored: lookup already in progress");
            return None;
        }

        let city = self.city.trim();
        if city.is_empty() {
            return None;
        }

        self.last_seq += 1;
        let ticket = LookupTicket {
            seq: self.last_seq,
            city: city.to_string(),
        };

        self.state = LookupState::Busy { seq: ticket.seq };
        self.error = None;
        tracing::debug!("Submitted weather search #{} for {}", ticket.seq, ticket.city);
        Some(ticket)
    }

    /// Apply the outcome of a lookup.
    ///
    /// Success replaces the report and clears the search box. Failure sets
    /// the inline error and leaves the previous report untouched.
    pub fn complete(&mut self, ticket: &LookupTicket, result: Result<WeatherReport, LookupError>) {
        if ticket.seq < self.last_seq {
            tracing::warn!(
                "Applying stale weather response #{} for {} (latest is #{})",
                ticket.seq,
                ticket.city,
                self.last_seq
            );
        }

        self.state = self.state.on_lookup_done();

        match result {
            Ok(report) => {
                tracing::info!("Weather updated for {}", report.name);
                self.report = Some(report);
                self.error = None;
                self.city.clear();
            }
            Err(e) => {
                tracing::warn!("Error fetching weather for {}: {}", ticket.city, e);
                self.error = Some(e.user_message().to_string());
            }
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> LookupState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        !self.state.can_submit()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Last successful report, regardless of what is currently shown.
    pub fn report(&self) -> Option<&WeatherReport> {
        self.report.as_ref()
    }

    /// Report to render: hidden while loading or while an error is shown.
    pub fn visible_report(&self) -> Option<&WeatherReport> {
        if self.is_loading() || self.error.is_some() {
            None
        } else {
            self.report.as_ref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report(name: &str) -> WeatherReport {
        WeatherReport {
            name: name.to_string(),
            country: "US".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            temperature: 72.5,
            unit_symbol: "°F".to_string(),
            humidity: 65,
            description: "partly cloudy".to_string(),
            icon: "02d".to_string(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn idle_allows_submit() {
        assert!(LookupState::Idle.can_submit());
        assert!(!LookupState::Busy { seq: 1 }.can_submit());
        assert_eq!(LookupState::Busy { seq: 1 }.on_lookup_done(), LookupState::Idle);
    }

    #[test]
    fn blank_city_is_not_submitted() {
        let mut panel = WeatherPanel::new();
        panel.set_city("   ");
        assert!(panel.submit().is_none());
        assert!(!panel.is_loading());
    }

    #[test]
    fn submit_sets_loading_and_trims() {
        let mut panel = WeatherPanel::new();
        panel.set_city("  London ");
        let ticket = panel.submit().unwrap();
        assert_eq!(ticket.city, "London");
        assert_eq!(ticket.seq, 1);
        assert!(panel.is_loading());
        assert!(panel.visible_report().is_none());
    }

    #[test]
    fn second_submit_blocked_while_loading() {
        let mut panel = WeatherPanel::new();
        panel.set_city("London");
        panel.submit().unwrap();
        panel.set_city("Paris");
        assert!(panel.submit().is_none());
    }

    #[test]
    fn success_replaces_report_and_clears_input() {
        let mut panel = WeatherPanel::new();
        panel.set_city("London");
        let ticket = panel.submit().unwrap();
        panel.complete(&ticket, Ok(report("London")));

        assert!(!panel.is_loading());
        assert_eq!(panel.city(), "");
        assert_eq!(panel.visible_report().map(|r| r.name.as_str()), Some("London"));
        assert!(panel.error().is_none());
    }

    #[test]
    fn failure_keeps_previous_report() {
        let mut panel = WeatherPanel::new();
        panel.set_city("London");
        let first = panel.submit().unwrap();
        panel.complete(&first, Ok(report("London")));

        panel.set_city("NonExistentCity");
        let second = panel.submit().unwrap();
        panel.complete(
            &second,
            Err(LookupError::CityNotFound("NonExistentCity".into())),
        );

        assert_eq!(panel.error(), Some("City not found"));
        assert_eq!(panel.city(), "NonExistentCity");
        assert!(panel.visible_report().is_none());
        assert_eq!(panel.report().map(|r| r.name.as_str()), Some("London"));
    }

    #[test]
    fn new_submit_clears_error() {
        let mut panel = WeatherPanel::new();
        panel.set_city("Nowhere");
        let ticket = panel.submit().unwrap();
        panel.complete(&ticket, Err(LookupError::MissingApiKey));
        assert!(panel.error().is_some());

        panel.submit().unwrap();
        assert!(panel.error().is_none());
    }

    #[test]
    fn stale_completion_still_applied() {
        let mut panel = WeatherPanel::new();
        panel.set_city("Pensacola");
        let first = panel.submit().unwrap();
        panel.complete(&first, Ok(report("Pensacola")));

        panel.set_city("Pittsburgh");
        let second = panel.submit().unwrap();
        panel.complete(&second, Ok(report("Pittsburgh")));

        // A late duplicate of the first response overwrites the newer one
        panel.complete(&first, Ok(report("Pensacola")));
        assert_eq!(panel.report().map(|r| r.name.as_str()), Some("Pensacola"));
        assert_eq!(second.seq, 2);
    }
}
