//! Actix middleware shared by every route.
//!
//! Authorization is not here: the gate needs the session and the route
//! table, so it lives with the HTTP adapter in
//! [`crate::inbound::http::authorization`].

pub mod trace;

pub use trace::Trace;
