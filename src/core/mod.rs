//! Core domain: cache, normalizers, trend resolution and conversion

pub mod cache;
pub mod clock;
pub mod config;
pub mod convert;
pub mod currency;
pub mod error;
pub mod http;
pub mod log;
pub mod news;
pub mod rates;
pub mod trend;

// Re-export main types for cleaner imports
pub use cache::{CacheStore, NewsTable, RatesTable, TrendTable};
pub use clock::{Clock, SystemClock};
pub use error::{FxError, Result};
pub use news::{NewsProvider, NewsRecord};
pub use rates::{RateProvider, RateRecord};
pub use trend::{TrendPoint, TrendProvider};
