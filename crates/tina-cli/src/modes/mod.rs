//! Runtime execution modes.
//!
//! - `repl`: line-oriented interactive chat over stdin/stdout

pub mod repl;
