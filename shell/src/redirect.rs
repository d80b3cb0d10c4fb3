use std::ffi::CString;
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd};

use nix::fcntl::{self, OFlag};
use nix::sys::stat::Mode;
use nix::unistd;

use crate::error::{ShellError, StageFailure, SyntaxError};
use crate::types::{Command, Redirect, RedirectType, RedirectionSpec, Stage, Token};

fn to_cstring(token: Token) -> Result<CString, ShellError> {
	CString::new(token).map_err(|e| {
		let bytes = e.into_vec();
		ShellError::Nul(String::from_utf8_lossy(&bytes).into_owned())
	})
}

/// Strips every `<`/`>` operator and its filename out of a stage.
///
/// Nothing is opened here; the files belong to the child that will attach
/// them, see [`RedirectionSpec::open`].
pub fn scan(stage: Stage) -> Result<Command, ShellError> {
	let mut argv: Vec<CString> = Vec::with_capacity(stage.tokens.len());
	let mut redirects: Vec<Redirect> = vec![];
	let mut tokens = stage.tokens.into_iter().enumerate();
	while let Some((i, token)) = tokens.next() {
		match RedirectType::from_token(&token) {
			Some(typ) => {
				if i == 0 {
					return Err(SyntaxError::MissingCommandBeforeRedirect(typ).into());
				}
				let target = match tokens.next() {
					Some((_, target)) => to_cstring(target)?,
					None => { return Err(SyntaxError::MissingFilename.into()); },
				};
				redirects.push(Redirect { typ: typ, target: target });
			},
			None => argv.push(to_cstring(token)?),
		}
	}
	Ok(Command { argv: argv, redirects: RedirectionSpec { redirects: redirects } })
}

/// Descriptors a stage will put on its standard input and output.
#[derive(Debug, Default)]
pub struct StdStreams {
	pub stdin: Option<OwnedFd>,
	pub stdout: Option<OwnedFd>,
}

impl StdStreams {
	/// Duplicates each descriptor onto its slot and closes the original.
	pub fn apply(self) -> Result<(), StageFailure<'static>> {
		let slots = [(self.stdin, RedirectType::Input.target_fd()), (self.stdout, RedirectType::Output.target_fd())];
		for (fd, slot) in slots {
			if let Some(fd) = fd {
				unistd::dup2(fd.as_raw_fd(), slot).map_err(|errno| StageFailure::Descriptor { errno: errno })?;
			}
		}
		Ok(())
	}
}

impl RedirectionSpec {
	/// Opens every target in order. A later redirect of the same direction
	/// replaces (and closes) the earlier one; the first failure stops the scan.
	pub fn open(&self) -> Result<StdStreams, StageFailure<'_>> {
		let mut streams = StdStreams::default();
		for redirect in &self.redirects {
			let mode = Mode::from_bits_truncate(0o666);
			let raw = fcntl::open(redirect.target.as_c_str(), redirect.typ.open_flags() | OFlag::O_CLOEXEC, mode)
				.map_err(|errno| StageFailure::File { path: &redirect.target, errno: errno })?;
			let fd = unsafe { OwnedFd::from_raw_fd(raw) };
			match redirect.typ {
				RedirectType::Input => streams.stdin = Some(fd),
				RedirectType::Output => streams.stdout = Some(fd),
			}
		}
		Ok(streams)
	}
}
