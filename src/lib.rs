//! Library exports for savolalab, shared between the binary and tests.

pub mod api;
pub mod config;
pub mod guard;
pub mod models;
pub mod navigation;
pub mod session;
pub mod startup;
pub mod state;
pub mod storage;
pub mod utils;
