//! chatvault - persistence layer for a Telegram group moderation bot.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - Backend adapters (MongoDB, SQLite, memory), records and feature repositories
//! - `cache` - Write-through keyed cache with chat re-keying
//! - `bot` - Telegram runtime that feeds the repositories

pub mod bot;
pub mod cache;
pub mod config;
pub mod database;
