//! # DS Link Library
//!
//! Drive a competition robot from your desktop.
//!
//! This library provides the core functionality for a driver station:
//! polling locally attached gamepads, packing operator intent into the
//! fixed-layout UDP control packet, and decoding the robot's periodic
//! status replies into a live telemetry model.

pub mod config;
pub mod error;
pub mod proto;
pub mod session;
pub mod input;
pub mod telemetry;
