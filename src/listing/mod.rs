//! Sources of `borg list --json-lines` records.
//!
//! A listing either comes straight from a running `borg` process or from a
//! file where such output was saved earlier.

mod borg_listing;
mod dump_listing;
mod listing_source;

pub use borg_listing::{BorgListing, BorgListingError};
pub use dump_listing::{DumpListing, DumpListingError};
pub use listing_source::{ListingSource, ListingSourceError};
