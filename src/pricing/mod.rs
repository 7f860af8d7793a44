//! Price parsing, currency lookup, conversion and ranking.
//!
//! Everything in here is synchronous and free of I/O.

pub mod currency;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod ranking;
pub mod rates;

pub use models::{
    ConversionError, ConversionReport, ConvertedRow, PriceRow, RankedEntry, RawPrice,
    NOT_AVAILABLE,
};
pub use parser::{parse_price, parse_raw};
pub use pipeline::{convert_all, convert_all_top, required_codes};
pub use ranking::{rank_cheapest, DEFAULT_TOP_N};
pub use rates::{convert, round2, RateTable};
