//! Core vocabulary shared by the game review crates.
//!
//! - [`Side`] names the first and second mover
//! - [`MoveOracle`] abstracts legal-move enumeration, SAN rendering and move
//!   application
//! - [`StandardRules`] is the standard-chess oracle backed by `shakmaty`

mod oracle;
mod side;
mod standard;

pub use oracle::{MoveOracle, OracleError};
pub use side::Side;
pub use standard::StandardRules;
