// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod local_store;
pub mod models;
pub mod normalize;
pub mod repository;
pub mod snapshot;
pub mod stats;
pub mod utils;
