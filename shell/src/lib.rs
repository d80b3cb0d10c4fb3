//! A small command interpreter: builtins `cd`, `pwd` and `exit`, and
//! pipelines of external programs with `<`/`>` file redirection.
//!
//! A line goes through [`parser::tokenize`], then either a builtin or
//! [`eval::eval`], which splits it into stages ([`pipeline`]), strips the
//! redirections ([`redirect`]), forks one process per stage ([`launch`]) and
//! reaps them all ([`job`]).

pub mod builtin;
pub mod error;
pub mod eval;
pub mod job;
pub mod launch;
pub mod logging;
pub mod parser;
pub mod pipeline;
pub mod redirect;
pub mod shell;
pub mod types;

pub use eval::{eval, execute, PipelineResult};
pub use shell::Shell;
