//! HTTP API: public storefront, admin back office and login.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
