//! Domain services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and the upstream boundary so route
//! handlers can stay focused on protocol translation.

pub mod editor;
pub mod offer;
pub mod voucher;
