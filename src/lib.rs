//! voyager-scrape - profile, company, post and search extraction over the
//! LinkedIn Voyager API.
//!
//! The core lives in [`graph`]: Voyager answers with normalized payloads
//! (`{data, included}` plus `*`-prefixed URN pointers), and [`graph`] turns
//! them back into plain records. [`parsers`] shape those records per
//! endpoint, [`client`] fetches them with a replayed browser session and
//! [`session`] keeps that session alive.

pub mod client;
pub mod config;
pub mod graph;
pub mod parsers;
pub mod session;
