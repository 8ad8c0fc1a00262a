//! Soapbox is a small community publishing service: accounts post short
//! texts, optionally filed under a group and carrying an image, and readers
//! comment on posts and follow authors. The crate is split into a domain
//! layer (records and validation), an application layer (services over
//! repository traits), and infrastructure (SQLite persistence, HTTP
//! surface, upload storage, telemetry).

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
