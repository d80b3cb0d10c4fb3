use log::debug;

use crate::error::SyntaxError;
use crate::types::{Pipeline, Stage, Token, PIPE};

/// Partitions one command line into stages at pipe separators.
///
/// A run of separators between two commands collapses into one; only a
/// leading or trailing separator is an error.
pub fn split(tokens: Vec<Token>) -> Result<Pipeline, SyntaxError> {
	if tokens.is_empty() {
		return Err(SyntaxError::EmptyCommand);
	}
	if tokens.first().map(String::as_str) == Some(PIPE) {
		return Err(SyntaxError::MissingCommandBeforePipe);
	}
	if tokens.last().map(String::as_str) == Some(PIPE) {
		return Err(SyntaxError::MissingCommandAfterPipe);
	}

	let mut stages: Vec<Stage> = vec![];
	let mut current = Stage::default();
	for token in tokens {
		if token == PIPE {
			if !current.tokens.is_empty() {
				stages.push(std::mem::take(&mut current));
			}
		} else {
			current.tokens.push(token);
		}
	}
	stages.push(current);

	debug!("split command line into {} stage(s)", stages.len());
	Ok(Pipeline { stages: stages })
}
