//! Drag-and-drop question grading service.
//!
//! Learners drag items onto zones of a background image. This crate holds the
//! grading core (definition normalization, placement validation, scoring,
//! the Standard/Assessment attempt protocols and feedback composition) and an
//! axum service that hosts it.

pub mod assets;
pub mod attempt;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod feedback;
pub mod learner;
pub mod logic;
pub mod normalize;
pub mod protocol;
pub mod routes;
pub mod scoring;
pub mod seeds;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod util;
pub mod validator;
