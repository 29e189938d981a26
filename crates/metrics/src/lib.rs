//! Engagement metrics — CSV store, synthetic example data, rolling 7-day
//! fatigue indicators, window aggregation and alert selection.

pub mod aggregate;
pub mod alerts;
pub mod rolling;
pub mod store;
pub mod synthetic;

pub use aggregate::{SegmentPerformance, WindowComparison, WindowTotals};
pub use alerts::FatigueAlert;
pub use store::{DataStore, Dataset};
