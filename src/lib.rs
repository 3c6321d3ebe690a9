//! twintop: dual-pane local + remote host monitor.
//!
//! Every half second the render loop snapshots kernel counters for this
//! machine and for one peer reached over ssh, diffs the cumulative counters
//! against the previous cycle to get rates and percentages, and paints two
//! bounded-width text panels side by side.

pub mod app;
pub mod config;
pub mod metrics;
pub mod panel;
pub mod procfs;
pub mod ps;
pub mod remote;
pub mod sampler;
pub mod snapshot;
