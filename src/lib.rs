//! Lesson-plan generation pipeline: prompt construction, completion
//! request, blank-line segmentation, document assembly, and the
//! wordprocessing container, fronted by a single-page web form.

pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
