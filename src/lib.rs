// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! fitvault: keep a personal archive of Garmin Connect fitness data.
//!
//! Raw payloads are downloaded into a local staging area, normalized into
//! canonical records and upserted into a document store (Firestore).

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod normalize;
pub mod services;
pub mod staging;
pub mod time_utils;
