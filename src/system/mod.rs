//! Process startup.
//!
//! This module contains functionality for:
//! - Command-line classification and startup configuration
//! - Platform adjustments and process identity
//! - The bootstrap sequence and its SDL toolkit

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod identity;
pub mod init;
pub mod platform;

pub const EXIT_SUCCESS: i32 = 0;
/// No hardware-accelerated OpenGL
pub const EXIT_NO_RENDERING: i32 = 1;
/// Generic failure, same value as C's `EXIT_FAILURE`
pub const EXIT_FAILURE: i32 = 1;
