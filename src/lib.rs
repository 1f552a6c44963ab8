pub mod api;
pub mod config;
pub mod humanize;
pub mod manifest;
pub mod observability;
pub mod storage;
pub mod tool;
pub mod workflow;
