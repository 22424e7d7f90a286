// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test utilities for the Tally workspace.

pub mod harness;
pub mod recording_sink;

pub use harness::TestHarness;
pub use recording_sink::{Delivery, RecordingSink};
