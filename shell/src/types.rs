use std::ffi::CString;
use std::fmt;
use std::os::unix::io::RawFd;

use nix::fcntl::OFlag;

pub type Token = String;

pub const PIPE: &str = "|";
pub const INPUT_REDIRECT: &str = "<";
pub const OUTPUT_REDIRECT: &str = ">";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectType { Input, Output }

impl RedirectType {
	pub fn from_token(token: &str) -> Option<RedirectType> {
		match token {
			INPUT_REDIRECT => Some(RedirectType::Input),
			OUTPUT_REDIRECT => Some(RedirectType::Output),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			RedirectType::Input => INPUT_REDIRECT,
			RedirectType::Output => OUTPUT_REDIRECT,
		}
	}

	/// Standard stream slot the opened file is attached to.
	pub fn target_fd(self) -> RawFd {
		match self {
			RedirectType::Input => libc::STDIN_FILENO,
			RedirectType::Output => libc::STDOUT_FILENO,
		}
	}

	pub fn open_flags(self) -> OFlag {
		match self {
			RedirectType::Input => OFlag::O_RDONLY,
			RedirectType::Output => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
		}
	}
}

impl fmt::Display for RedirectType {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
	pub typ: RedirectType,
	pub target: CString,
}

/// Redirections of one stage in the order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectionSpec {
	pub redirects: Vec<Redirect>,
}

/// One pipeline segment before redirection scanning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stage {
	pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
	pub stages: Vec<Stage>,
}

/// A stage with its redirections stripped out of the argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
	pub argv: Vec<CString>,
	pub redirects: RedirectionSpec,
}

impl Command {
	pub fn program(&self) -> &CString {
		&self.argv[0]
	}
}
