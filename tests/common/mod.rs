//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod fault_store;
pub mod counting_lock;
