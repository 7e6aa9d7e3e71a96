//! Client-side state: the authenticated session and its durable mirror.

pub mod session;
pub mod storage;
