//! Domain types: tickers, fetch windows, bars, price series, company metadata.

pub mod bar;
pub mod company;
pub mod range;
pub mod ticker;

pub use bar::{Bar, PriceSeries, SeriesError};
pub use company::CompanyInfo;
pub use range::{
    check_date_range, validate_date_range, DateRange, DateRangeIssue, FetchWindow, Period,
    ValidationError, MAX_RANGE_DAYS,
};
pub use ticker::{validate_ticker, Ticker};
