//! Pricing page fetching and table extraction.

pub mod client;
pub mod selectors;
pub mod table;

pub use client::{PageClient, PageFetch};
pub use table::{ColumnChoice, PricingTable};
