//! # cg-types
//!
//! Shared vocabulary for the Cogneato client: parameter values, the
//! `"name:domain"` column schema, measurement rows, the column-oriented table
//! format used on the wire, and the error taxonomy.

pub mod errors;
pub mod measurement;
pub mod params;
pub mod schema;
pub mod table;

pub use errors::*;
pub use measurement::*;
pub use params::*;
pub use schema::*;
pub use table::*;
