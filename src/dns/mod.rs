//! DNS record querying.
//!
//! This module provides async DNS operations using `hickory-resolver`:
//! - Canonical name queries (CNAME records)
//! - Certification authority authorization queries (CAA records)

mod records;

// Re-export public API
pub use records::{lookup_caa_records, lookup_cname_records};
