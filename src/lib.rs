//! Two-line element parsing, frame conversion and observer geometry for
//! Earth satellites.

pub mod config;
pub mod frames;
pub mod predict;
pub mod tle;
