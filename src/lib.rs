//! # listing-scout
//!
//! Query and filter engine for the Philippine Real Estate Inventory.
//!
//! Rows come from a [`store::ListingStore`] (the hosted PostgREST table or a
//! local JSON snapshot). An [`engine::ListingEngine`] turns table interactions
//! ([`filter::FilterAction`]) into an ordered, bounded [`engine::ListingView`],
//! either by filtering one snapshot in memory or by querying the store on
//! every change.

pub mod cli;
pub mod config;
pub mod content;
pub mod display;
pub mod engine;
pub mod error;
pub mod filter;
pub mod models;
pub mod store;

pub use engine::{EngineMode, EngineSettings, ListingEngine, ListingView, ViewStatus};
pub use error::StoreError;
pub use models::{Column, Listing};
