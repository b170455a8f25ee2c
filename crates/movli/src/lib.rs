//! A chat client for the movli movie assistant.
//!
//! The crate wires the HTTP backend to the session controller and ships a
//! terminal front-end. Use it as a library to embed the assistant's chat
//! into your own host app.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

mod hint;
mod session;
mod tokens;

pub use hint::{SIGNED_OUT_HINT, WELCOME_HINT, empty_state};
pub use session::{Session, SessionBuilder};
pub use tokens::StaticTokenProvider;

/// Re-exports of [`movli_core`] crate.
pub mod core {
    pub use movli_core::*;
}

/// Re-exports of [`movli_http`] crate.
pub mod http {
    pub use movli_http::*;
}
