//! Administrative client for the recipe-sharing platform API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `state` owns the authenticated session and its durable mirror, `net`
//! talks to the remote API, `router` decides which view a navigation lands
//! on, and `app` ties session events to navigation. The `recipe-admin`
//! binary drives all of it from the command line.

pub mod app;
pub mod config;
pub mod net;
pub mod router;
pub mod state;

#[cfg(test)]
mod test_support;
