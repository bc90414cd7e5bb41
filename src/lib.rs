//! FloodAlert - report and browse flood alerts tied to geographic locations.
//!
//! # Overview
//!
//! Users submit alerts (a message, a severity and the place they are at) and
//! browse everybody's alerts, optionally narrowed down by city, by distance
//! from their current position, or ordered by recency.
//!
//! The heart of the crate is [`query::apply_filters`], a pure function that
//! turns the stored alerts into the visible list. Everything else is the
//! plumbing around it: persistence, request identity, reverse geocoding and
//! the HTTP surface.
//!
//! # Modules
//!
//! - [`model`]: Alert records, filter criteria and API bodies
//! - [`geo`]: Haversine distance and the alert radius
//! - [`query`]: The filter/sort pipeline
//! - [`storage`]: SQLite alert store
//! - [`session`]: Per-request user identity
//! - [`geocode`]: Reverse geocoding client
//! - [`error`]: Error taxonomy and HTTP mapping
//! - [`config`]: Environment configuration
//! - [`api`]: HTTP API handlers

pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod geocode;
pub mod model;
pub mod query;
pub mod session;
pub mod storage;
