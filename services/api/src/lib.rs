//! services/api/src/lib.rs
//!
//! The study assistant service: document extraction and model adapters, the
//! orchestrator that turns extracted text into a summary and a quiz, and the
//! HTTP surface around it.

pub mod adapters;
pub mod assistant;
pub mod config;
pub mod error;
pub mod storage;
pub mod web;
