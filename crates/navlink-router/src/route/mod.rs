//! Route compilation and ordering
//!
//! - [`segment`] classifies pattern segments and names
//! - [`compiler`] flattens a configuration into route records
//! - [`ordering`] sorts records into match order

pub mod compiler;
pub mod ordering;
pub mod segment;

pub use compiler::{compile, CompiledRoutes, ConfigNode, InitialRouteRecord, NormalizedConfig, RouteKind, RouteRecord};
pub use ordering::{compare_routes, sort_routes};
pub use segment::{classify_segment, RouteSegment};
