//! MTA subway service status from the GTFS-realtime alerts feed.
//!
//! [`FeedSource`] fetches the feed and keeps the latest document;
//! [`Classification`] groups the valid lines by the alert types active at a
//! given instant and collects the lines that have none.

pub mod classify;
pub mod config;
pub mod error;
pub mod feed;
pub mod model;

pub use classify::{
    AlertGroups, Classification, NON_ACTIVE_ALERTS, active_by_type, non_active_lines,
};
pub use config::FeedConfig;
pub use error::{ConfigError, FeedError, FetchError};
pub use feed::FeedSource;
pub use model::{ActivePeriod, AlertEntity, FeedDocument, InformedEntity, LineId};
