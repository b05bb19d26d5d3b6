//! Client-side access layer for the data-cloud service.
//!
//! # Overview
//! A `Session` authenticates once against the remote service with a
//! `db_key`, then performs CRUD operations on client records while keeping a
//! local mirror of the collection in step with each acknowledged write.
//! Reads from the mirror never touch the network.
//!
//! # Design
//! - `DataCloudClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`, so the wire format is testable
//!   without I/O.
//! - `Transport` is the only I/O seam; `ReqwestTransport` is the production
//!   implementation and tests plug in scripted ones.
//! - `Session` owns the authorization flag and the `LocalMirror`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod mirror;
pub mod session;
pub mod transport;
pub mod types;

pub use client::DataCloudClient;
pub use error::{ApiError, Operation};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use mirror::LocalMirror;
pub use session::{InitOptions, Session, SessionConfig};
pub use transport::{ReqwestTransport, Transport};
pub use types::{Client, ClientUpdates, ConnectionStatus, CreateClient, UpdateClient, UpdateResponse};
