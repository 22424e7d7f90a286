// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules. All SQL lives here, scoped by chat id.

pub mod tasks;
