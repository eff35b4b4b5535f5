//! Library side of the `sdtm` binary: logging setup, study loading and
//! output, and the summary table.

pub mod logging;
pub mod pipeline;
pub mod summary;
