// SYNOID Agent Modules
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod caption;
pub mod compositor;
pub mod description;
pub mod emotion;
pub mod intake;
pub mod media_tools;
pub mod muxer;
pub mod palette;
pub mod pipeline;
pub mod story;
pub mod voice;
