use std::ffi::CStr;
use std::fs::File;
use std::io::Write;
use std::mem::ManuallyDrop;
use std::os::unix::io::FromRawFd;

use nix::errno::Errno;
use thiserror::Error;

use crate::types::RedirectType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
	#[error("missing command before pipe")]
	MissingCommandBeforePipe,
	#[error("missing command after pipe")]
	MissingCommandAfterPipe,
	#[error("missing command before {0}")]
	MissingCommandBeforeRedirect(RedirectType),
	#[error("missing filename after redirect")]
	MissingFilename,
	#[error("empty command")]
	EmptyCommand,
	#[error("unterminated quote")]
	UnterminatedQuote,
}

/// Errors raised in the supervising process. None of them leaves a child behind.
#[derive(Debug, Error)]
pub enum ShellError {
	#[error("syntax error: {0}")]
	Syntax(#[from] SyntaxError),
	#[error("{0}: argument contains a nul byte")]
	Nul(String),
	#[error("pipe failure: {}", .0.desc())]
	Pipe(Errno),
	#[error("fork failure: {}", .0.desc())]
	Spawn(Errno),
}

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_NOT_EXECUTABLE: i32 = 126;
pub const EXIT_NOT_FOUND: i32 = 127;

/// Terminal outcome of a stage whose program never started.
///
/// Only produced between `fork` and `exec`, so it borrows everything it
/// names and reports without touching the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageFailure<'a> {
	File { path: &'a CStr, errno: Errno },
	Exec { program: &'a CStr, errno: Errno },
	Descriptor { errno: Errno },
}

impl<'a> StageFailure<'a> {
	pub fn exit_code(&self) -> i32 {
		match *self {
			StageFailure::File { .. } | StageFailure::Descriptor { .. } => EXIT_FAILURE,
			StageFailure::Exec { errno: Errno::ENOENT, .. } => EXIT_NOT_FOUND,
			StageFailure::Exec { .. } => EXIT_NOT_EXECUTABLE,
		}
	}

	pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
		let (subject, errno): (&[u8], Errno) = match *self {
			StageFailure::File { path, errno } => (path.to_bytes(), errno),
			StageFailure::Exec { program, errno } => (program.to_bytes(), errno),
			StageFailure::Descriptor { errno } => (b"dup2", errno),
		};
		w.write_all(subject)?;
		w.write_all(b": ")?;
		w.write_all(errno.desc().as_bytes())?;
		w.write_all(b"\n")
	}

	/// Writes the diagnostic straight to descriptor 2, bypassing the std lock.
	pub fn report(&self) {
		let mut stderr = ManuallyDrop::new(unsafe { File::from_raw_fd(libc::STDERR_FILENO) });
		let _ = self.write_to(&mut *stderr);
	}

	pub fn terminate(self) -> ! {
		self.report();
		unsafe { libc::_exit(self.exit_code()) }
	}
}
