//! Weather lookup for QuickCalc
//!
//! City search via the OpenWeather geocoding API, followed by a current
//! conditions request for the first match. [`WeatherPanel`] holds the
//! search box, loading and error state a front end renders.

pub mod panel;
pub mod provider;
pub mod types;

pub use panel::{LookupState, LookupTicket, WeatherPanel};
pub use provider::WeatherProvider;
pub use types::*;
