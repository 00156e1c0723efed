//! Tsunami risk prediction: input schema, parameter form, model inference and
//! the presentation model rendered by the dashboard.
//!
//! Flow per trigger: [`form::FormState`] → [`assemble::assemble`] →
//! [`predict::predict`] → [`report::Report::build`]. The model itself is
//! loaded once per process through [`loader::load_model`].

pub mod assemble;
pub mod coords;
pub mod error;
pub mod form;
pub mod loader;
pub mod model;
pub mod predict;
pub mod report;
pub mod schema;

pub use error::{ModelError, Result};
pub use model::{Classifier, TsunamiModel};
