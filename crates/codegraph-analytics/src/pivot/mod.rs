//! Pivot/explore query engine: group internal symbols by closed-set or
//! bucketed dimensions, aggregate named or dynamic measures, and emit the
//! induced subgraph between groups.

mod dims;
mod engine;
mod measures;
mod row;

pub use dims::{BucketField, BucketMode, Dimension, ResolvedDim, SimpleDim};
pub use engine::{available_values, pivot, GraphEdge, PivotNode, PivotResult};
pub use measures::{Agg, Measure, MeasureField, MeasureType, SpecialMeasure};
pub use row::{build_rows, PivotRow};
