#![deny(missing_docs)]
//! Homepage listings: properties and blogs, and the capacity limited set of
//! them that is featured on the landing page.
//!
//! Follows the hexagonal layout, the [domain] owns the rules and the
//! [inbound] / [outbound] adapters are opt-in through cargo features.

pub mod domain;
#[cfg(feature = "inbound")]
pub mod inbound;
pub mod outbound;
