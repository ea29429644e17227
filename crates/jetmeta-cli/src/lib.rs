//! CLI library components for the jetmeta tool.

pub mod logging;
