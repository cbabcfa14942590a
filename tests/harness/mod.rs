// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for the marketing site API.
//!
//! Provides an in-memory app with recording mail transports, plus
//! utilities for simulating abusive contact-form traffic.

#![allow(dead_code)]

pub mod app;
pub mod attacks;
pub mod generators;
pub mod metrics;
