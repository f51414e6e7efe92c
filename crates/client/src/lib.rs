//! Village Water System client.
//!
//! Talks to the utility's REST backend on behalf of one signed-in user.
//!
//! # Architecture
//!
//! ```text
//! RouteGuard ──observes──▶ AuthState (watch channel)
//!                               ▲
//! AuthSession ──login/logout────┤
//!      │                        │
//!      ▼                        │
//! ApiClient ──WithAuthRefresh───┘──▶ Transport (reqwest / scripted)
//!      │
//!      ▼
//! SessionStore (file / memory)
//! ```
//!
//! - [`session`] persists the access token, refresh token and user profile.
//! - [`transport`] is a pure `request -> response` seam; [`ReqwestTransport`]
//!   is the production implementation.
//! - [`ApiClient`] attaches the bearer token and applies the single
//!   refresh-and-retry policy on `401`.
//! - [`AuthSession`] owns login, registration, logout and profile updates,
//!   and publishes [`AuthState`] changes.
//! - [`RouteGuard`] decides whether a [`Route`] may render.
//! - [`api`] holds typed clients for the backend's resources.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod guard;
mod refresh;
pub mod session;
pub mod transport;

pub use auth::{AuthSession, AuthState, LoginError, RegisterError};
pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, TransportError};
pub use guard::{GuardDecision, Route, RouteGuard};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore, SessionStoreError};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};

#[cfg(any(test, feature = "testing"))]
pub use transport::scripted::{RecordedRequest, ScriptedTransport};
