//! # cabinet-auth
//!
//! Session token authentication for Cabinet.
//!
//! Tokens are opaque strings minted by an external login flow, which
//! stores the owning user id under `auth_<token>` in the credential store.
//! This crate only resolves them; it never issues or revokes tokens.

pub mod token;

pub use token::TokenResolver;
