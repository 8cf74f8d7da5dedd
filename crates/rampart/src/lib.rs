//! # Rampart - form submission gatekeeper
//!
//! Guards page forms with field validation, an arithmetic challenge, a
//! hidden honeypot field and a rolling submission limit kept in a local
//! key-value store.
//!
//! ## Flow
//! ```text
//! Idle → Validating → CheckingChallenge → Submitting → Succeeded
//!            ↓               ↓       ↘             ↘
//!         Rejected    ChallengeFailed  RateLimited   Failed
//! ```

pub mod captcha;
pub mod cli;
pub mod config;
pub mod honeypot;
pub mod limiter;
pub mod notify;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod storage;
pub mod submitter;
pub mod validation;
