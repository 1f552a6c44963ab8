//! Manifest reports produced by the provenance tool
//!
//! - [`ManifestReport`] - the tool's JSON output, plus the derived
//!   `manifestLocation` field
//! - [`ManifestLocation`] - where the active manifest is stored
//! - [`ManifestDetails`] - normalized projection of the active manifest that
//!   the client renders

mod details;
mod location;
mod report;

pub use details::{ManifestDetails, display_claim_generator};
pub use location::{ManifestLocation, ManifestType};
pub use report::{MANIFEST_LOCATION_FIELD, ManifestReport, ReportError};
