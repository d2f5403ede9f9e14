//! YAML declarations of action categories
//!
//! A category file names the category, maps element names to area ids and
//! lists the actions to build. Loading validates the declarations and
//! returns a ready `ActionCategory`.
//!
//! ```ignore
//! let category = val_config::load_category_file("climate.yaml", compat, permissions, handle)?;
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{build_category, load_category_file, load_category_str, parse_category, validate};
pub use schema::{
    ActionDeclaration, ActionKindDeclaration, CategoryFile, GeneratorDeclaration, PropertyRef, ScalarValue,
};
