//! # popbill-core — Identifier types for the Popbill API
//!
//! Domain-primitive newtypes for the identifiers the Popbill service is
//! strict about: business registration numbers, collection job IDs, NTS
//! confirmation numbers, and `YYYYMMDD` dates. Each is a distinct type
//! validated at construction — a [`JobId`] cannot be passed where a
//! [`NtsConfirmNum`] is expected, and a malformed value never reaches the
//! wire.
//!
//! The client crate (`popbill-client`) depends on this crate only for these
//! newtypes and [`PartnerIdentity`].

pub mod error;
pub mod identity;

pub use error::ValidationError;
pub use identity::{CorpNum, JobId, NtsConfirmNum, PartnerIdentity, Ymd};
