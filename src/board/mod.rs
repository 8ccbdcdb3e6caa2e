//! Board geometry: adjacency, coordinates, line of sight, range fill.
//!
//! Everything here is deterministic and independent of any particular
//! battle. `BoardGeometry` precomputes its lookup tables once from the
//! cell count and is immutable thereafter; battles share one instance.

pub mod geometry;
pub mod range;

pub use geometry::BoardGeometry;
