//! Revsync Supabase - Supabase store integration for revsync
//!
//! This crate talks to a Supabase project's PostgREST endpoint to read
//! candidate usernames and existing reviews, and to append review rows.

mod client;
mod error;
mod rest;

#[cfg(test)]
mod testing;

pub use client::SupabaseClient;
pub use error::{Error, Result};
