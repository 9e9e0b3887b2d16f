//! Vocabulary subsystems built on the core store.

pub mod console;
pub mod import;
pub mod lookup;
pub mod review;
pub mod sm2;
pub mod words;
