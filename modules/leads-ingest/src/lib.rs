//! Reads the scraper pipeline's `<root>/<city>/<date>/*.csv` tree into a
//! [`LeadsAggregate`](leads_common::LeadsAggregate).

pub mod aggregator;
pub mod scanner;

pub use aggregator::{aggregate, load_leads, read_leads_file};
pub use scanner::{scan, scan_city};
