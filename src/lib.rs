//! Slot-date arithmetic and leader schedule inspection for Jormungandr nodes

pub mod commands;
pub mod config;
pub mod jormungandr;
