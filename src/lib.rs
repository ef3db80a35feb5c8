pub mod alumni;
pub mod config;
pub mod feed;
pub mod fixture_cache;
pub mod fixtures;
pub mod merge;
pub mod models;
pub mod name_key;
pub mod options;
pub mod profile_db;
pub mod profile_image;
pub mod profile_store;
pub mod search;
pub mod session;
pub mod state;
pub mod stats;
pub mod supabase;
pub mod validation;
