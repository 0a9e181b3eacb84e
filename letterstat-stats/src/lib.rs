//! letterstat statistics
//!
//! Letter counting, the concurrent aggregation pipeline and report rendering

pub mod analyzer;
pub mod histogram;
pub mod pipeline;
pub mod report;

pub use analyzer::*;
pub use histogram::*;
pub use pipeline::*;
pub use report::*;
