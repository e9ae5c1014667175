//! CLI library components for the VitalView summarizer.

pub mod commands;
pub mod logging;
pub mod report;
