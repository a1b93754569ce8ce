//! Domain model: statistics record, stage tasks and payloads, formatting and
//! the card template.

pub mod blueprint;
pub mod format;
pub mod stats;
pub mod username;

pub use self::blueprint::{Blueprint, STATS_ANCHOR_ID, has_stats_anchor};
pub use self::format::{format_date, format_stat};
pub use self::stats::{FetchRequest, GitHubStats, RenderedCard};
pub use self::username::{MAX_USERNAME_LEN, parse_github_username};
