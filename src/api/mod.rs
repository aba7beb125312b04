//! Backend HTTP collaborators
//!
//! The session consumes the recipe backend as a client only: recipe lookup
//! and on-demand translation. Everything else the backend offers
//! (recommendation, ingredient detection) is outside this crate.

mod recipes;
mod translate;

pub use recipes::{Recipe, RecipeClient};
pub use translate::{HttpTranslator, Translator};
