//! Weather backend: async lookups off the input thread.
//! Results are sent back via mpsc and applied by the caller.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use quickcalc_weather::{LookupError, LookupTicket, WeatherProvider, WeatherReport};

/// Messages sent from async operations back to the input thread
#[derive(Debug)]
pub enum WeatherServiceMessage {
    /// Result of one submitted search
    LookupDone(LookupTicket, Result<WeatherReport, LookupError>),
}

/// Request a weather lookup for `ticket.city`.
/// Sends `LookupDone` on the channel when complete.
pub fn request_lookup(
    tx: &Sender<WeatherServiceMessage>,
    runtime: &tokio::runtime::Handle,
    provider: Arc<WeatherProvider>,
    ticket: LookupTicket,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = provider.lookup(&ticket.city).await;
        if tx.send(WeatherServiceMessage::LookupDone(ticket, result)).is_err() {
            tracing::debug!("Weather result dropped: receiver closed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcalc_core::WeatherConfig;

    #[test]
    fn lookup_without_key_reports_back() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let provider = Arc::new(WeatherProvider::new(&WeatherConfig::default()).unwrap());
        let (tx, rx) = std::sync::mpsc::channel();

        let ticket = LookupTicket {
            seq: 1,
            city: "London".to_string(),
        };
        request_lookup(&tx, runtime.handle(), provider, ticket.clone());

        let msg = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap();

        match msg {
            WeatherServiceMessage::LookupDone(t, result) => {
                assert_eq!(t, ticket);
                assert!(matches!(result, Err(LookupError::MissingApiKey)));
            }
        }
    }
}
