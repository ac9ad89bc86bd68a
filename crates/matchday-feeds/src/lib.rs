//! Collaborator boundary for matchday: decoders that turn already-fetched
//! upstream payloads into [`Fixture`](matchday_core::Fixture) records.
//!
//! Pure and synchronous; fetching lives in the binary. Per-item problems
//! never fail a payload: the item is dropped and decoding continues.
//!
//! # Quick start
//!
//! ```no_run
//! use chrono::Utc;
//! use matchday_core::Source;
//! use matchday_feeds::calendar::{self, CalendarFeed};
//!
//! let ics = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nDTSTART:20251108T193000Z\r\n\
//!            SUMMARY:Dublin v Kerry\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
//! let feed = CalendarFeed { url: "https://club.example/feed.ics", source: Source::Calendar, adult_football_only: false };
//! let fixtures = calendar::decode(ics, &feed, Utc::now()).unwrap();
//! println!("{} fixtures", fixtures.len());
//! ```

pub mod boundary;
pub mod calendar;
pub mod club;
pub mod error;
pub mod ical;
pub mod payload;
pub mod registry;
pub mod summary;

pub use boundary::admit;
pub use calendar::CalendarFeed;
pub use error::{Error, Result};
