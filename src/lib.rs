//! Course Advisor: conversational academic advising over a course catalog.

pub mod advising;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
