// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Tally bot core: conversation state machine, per-chat dispatcher,
//! session store, summary generator, and text resources.
//!
//! Everything here is transport-agnostic. The controller consumes
//! [`ChatEvent`](tally_core::ChatEvent)s and produces
//! [`Reply`](tally_core::Reply)s; the dispatcher serializes events per chat
//! and pushes replies through a [`ReplySink`](tally_core::ReplySink).

pub mod controller;
pub mod dispatch;
pub mod session;
pub mod summary;
pub mod texts;

pub use controller::Controller;
pub use dispatch::Dispatcher;
pub use session::InMemorySessionStore;
pub use summary::SummaryGenerator;
pub use texts::{TextKey, TextResources};
