//! Domain types for TrendMatrix

pub mod bar;
pub mod timeframe;

pub use bar::{Bar, BarError, BarSeries};
pub use timeframe::{default_timeframe_labels, split_timeframe_list, Timeframe, TimeframeError};
