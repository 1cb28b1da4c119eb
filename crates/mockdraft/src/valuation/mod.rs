// Valuation engine: player loading, VBD rankings, value-pick regression.

pub mod projections;
pub mod rankings;
pub mod regression;
