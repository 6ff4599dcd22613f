//! Wellspring authentication core.
//!
//! This crate implements the sign-in slice of the Wellspring patient portal:
//! requesting a one-time code, exchanging it for tokens, persisting the
//! session, and deciding on every navigation whether the current path may be
//! rendered. Host shells (web, desktop, tests) embed it and act on the
//! navigation instructions it returns; nothing here renders anything.
//!
//! # Components
//!
//! - [`session`] - durable key-value persistence of credential material
//! - [`api`] - REST client for the Wellspring backend sign-in endpoints
//! - [`flow`] - orchestration of request-code / verify-code / logout
//! - [`guard`] - public/protected route classification and redirects
//! - [`config`] - environment-driven configuration
//! - [`state`] - cheap-clone handle wiring the pieces together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod flow;
pub mod guard;
pub mod session;
pub mod state;
