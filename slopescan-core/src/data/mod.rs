//! Data acquisition: providers, cleaning and listing resolution.

pub mod circuit_breaker;
pub mod csv_import;
pub mod ingest;
pub mod listing;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use csv_import::{read_csv_bars, CsvProvider};
pub use ingest::{ingest, IngestReport};
pub use listing::{clean_code, resolve_listing};
pub use provider::{DataError, DataProvider, DataSource, FetchResult};
pub use synthetic::{generate_synthetic_bars, SyntheticProvider};
pub use yahoo::YahooProvider;
