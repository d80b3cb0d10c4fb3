use std::io::{self, BufRead, Write};

use log::{debug, info};
use nix::sys::signal::{self, SigHandler, Signal};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::builtin::{self, Flow};
use crate::error::{ShellError, EXIT_FAILURE};
use crate::eval;
use crate::parser;
use crate::types::Token;

pub const PROMPT: &str = "$ ";
pub const LAST_STATUS_TOKEN: &str = "$?";

pub struct Shell {
	last_status: i32,
}

impl Default for Shell {
	fn default() -> Shell {
		Shell::new()
	}
}

impl Shell {
	pub fn new() -> Shell {
		Shell { last_status: 0 }
	}

	pub fn last_status(&self) -> i32 {
		self.last_status
	}

	fn substitute_status(&self, tokens: &mut [Token]) {
		for token in tokens.iter_mut().filter(|t| t.as_str() == LAST_STATUS_TOKEN) {
			*token = self.last_status.to_string();
		}
	}

	/// Tokenizes and runs one line. Blank lines leave the status alone.
	pub fn eval_line(&mut self, line: &str) -> Flow {
		let mut tokens = match parser::tokenize(line) {
			Ok(tokens) => tokens,
			Err(e) => {
				let _ = writeln!(&mut io::stderr(), "{}", ShellError::from(e));
				self.last_status = EXIT_FAILURE;
				return Flow::Continue(EXIT_FAILURE);
			},
		};
		if tokens.is_empty() {
			return Flow::Continue(self.last_status);
		}
		self.substitute_status(&mut tokens);

		let flow = match builtin::match_builtin(&tokens[0]) {
			Some(func) => func(&tokens[1..]),
			None => Flow::Continue(eval::eval(tokens)),
		};
		if let Flow::Continue(status) = flow {
			debug!("status {}", status);
			self.last_status = status;
		}
		flow
	}

	/// Runs commands read from `input` until end of input or `exit`.
	/// Returns the code the process should exit with.
	///
	/// Lines are read as bytes; invalid UTF-8 is replaced, not fatal.
	pub fn run_script<R: BufRead>(&mut self, mut input: R) -> io::Result<i32> {
		let mut line: Vec<u8> = vec![];
		loop {
			line.clear();
			if input.read_until(b'\n', &mut line)? == 0 {
				return Ok(0);
			}
			if let Flow::Exit(code) = self.eval_line(&String::from_utf8_lossy(&line)) {
				return Ok(code);
			}
		}
	}

	/// Prompt loop on a terminal. Ctrl-C is ignored by the shell itself and
	/// only reaches the stages of the running pipeline.
	pub fn run_interactive(&mut self) -> anyhow::Result<i32> {
		unsafe {
			signal::signal(Signal::SIGINT, SigHandler::SigIgn)?;
		}
		let mut editor = DefaultEditor::new()?;
		info!("interactive session started");
		loop {
			match editor.readline(PROMPT) {
				Ok(line) => {
					if !line.trim().is_empty() {
						editor.add_history_entry(line.as_str())?;
					}
					if let Flow::Exit(code) = self.eval_line(&line) {
						return Ok(code);
					}
				},
				Err(ReadlineError::Interrupted) => {},
				Err(ReadlineError::Eof) => {
					println!();
					return Ok(0);
				},
				Err(ReadlineError::Io(ref e)) if e.kind() == io::ErrorKind::InvalidData => {
					let _ = writeln!(&mut io::stderr(), "pipesh: {}", e);
					self.last_status = EXIT_FAILURE;
				},
				Err(e) => { return Err(e.into()); },
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_substitution() {
		let mut sh = Shell::new();
		sh.last_status = 42;
		let mut tokens: Vec<Token> = vec!["echo".into(), "$?".into(), "x$?".into()];
		sh.substitute_status(&mut tokens);
		assert_eq!(tokens, vec!["echo", "42", "x$?"]);
	}

	#[test]
	fn blank_line_keeps_status() {
		let mut sh = Shell::new();
		sh.last_status = 5;
		assert_eq!(sh.eval_line("   "), Flow::Continue(5));
		assert_eq!(sh.last_status(), 5);
	}

	#[test]
	fn tokenizer_error_sets_failure() {
		let mut sh = Shell::new();
		assert_eq!(sh.eval_line("echo 'open"), Flow::Continue(EXIT_FAILURE));
		assert_eq!(sh.last_status(), EXIT_FAILURE);
	}

	#[test]
	fn syntax_error_sets_failure() {
		let mut sh = Shell::new();
		assert_eq!(sh.eval_line("| true"), Flow::Continue(EXIT_FAILURE));
		assert_eq!(sh.eval_line("true |"), Flow::Continue(EXIT_FAILURE));
	}

	#[test]
	fn invalid_utf8_line_does_not_stop_script() {
		let mut sh = Shell::new();
		let script: &[u8] = b"exit caf\xe9 x\nexit 6\n";
		assert_eq!(sh.run_script(script).unwrap(), 6);
		assert_eq!(sh.last_status(), EXIT_FAILURE);
	}

	#[test]
	fn exit_stops_script() {
		let mut sh = Shell::new();
		let script = "exit 3\nexit 4\n";
		assert_eq!(sh.run_script(script.as_bytes()).unwrap(), 3);
	}

	#[test]
	fn exit_with_extra_arguments_continues() {
		let mut sh = Shell::new();
		let script = "exit 1 2\nexit $?\n";
		assert_eq!(sh.run_script(script.as_bytes()).unwrap(), EXIT_FAILURE);
	}
}
