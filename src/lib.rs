// SYNOID Canvas Library Root
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Drawing in, narrated story video out.

pub mod agent;
pub mod config;
pub mod error;
pub mod server;

pub use config::CanvasConfig;
pub use error::{CanvasError, Result, Stage};
