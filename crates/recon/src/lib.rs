//! `skyledger-recon` - record reconciliation.
//!
//! Pure engine crate: receives decoded records, returns merged or selected
//! records. No IO.
//!
//! - [`merge`]: combine two descriptions of one transient
//! - [`spatial`]: decide identity from angular separation
//! - [`query`]: filter a collection
//! - [`reconcile`](reconcile::reconcile): fold staging records into a result set
//! - [`Catalog`]: in-memory store that merges on save

pub mod catalog;
pub mod engine;
pub mod error;
pub mod fields;
pub mod naming;
pub mod query;
pub mod reconcile;
pub mod spatial;
pub mod tabular;

pub use catalog::{Catalog, SaveOutcome};
pub use engine::{merge, MergePolicy};
pub use error::{ReconError, Result};
pub use query::{cone_search, select_records, ClassFilter, Cone, NameQuery, RecordFilter, RedshiftRange};
pub use reconcile::reconcile;
pub use spatial::{find_match, spatial_match, Locate};
