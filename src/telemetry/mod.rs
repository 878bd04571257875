//! # Telemetry Module
//!
//! Robot status logging to JSONL files with rotation.
//!
//! This module handles:
//! - Formatting decoded robot status as JSONL (JSON Lines)
//! - Writing to rotating log files (max N records per file)
//! - Retaining only the last M files

pub mod logger;

pub use logger::StatusLogger;
