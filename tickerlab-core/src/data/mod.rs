//! Data source adapters.
//!
//! Every adapter implements [`DataProvider`]. Network access lives only in
//! [`YahooProvider`]; the synthetic and CSV providers work offline.

pub mod circuit_breaker;
pub mod csv_import;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use csv_import::CsvProvider;
pub use provider::{
    DataError, DataProvider, DataSource, FetchOutcome, FetchRequest, FetchSettings,
};
pub use synthetic::{SyntheticMode, SyntheticProvider};
pub use yahoo::YahooProvider;
