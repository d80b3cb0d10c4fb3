use std::convert::Infallible;
use std::os::unix::io::{AsRawFd, OwnedFd, RawFd};

use log::{debug, warn};
use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd::{self, ForkResult, Pid};

use crate::error::{ShellError, StageFailure};
use crate::types::Command;

#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
fn cloexec_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
	unistd::pipe2(nix::fcntl::OFlag::O_CLOEXEC)
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
fn cloexec_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
	use nix::fcntl::{fcntl, FcntlArg, FdFlag};
	let (r, w) = unistd::pipe()?;
	for fd in [&r, &w] {
		fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
	}
	Ok((r, w))
}

/// The N-1 pipes joining N stages. Pipe `i` carries stage `i`'s output to
/// stage `i + 1`'s input.
#[derive(Debug)]
pub struct PipeTable {
	pipes: Vec<(OwnedFd, OwnedFd)>,
}

impl PipeTable {
	pub fn create(stage_count: usize) -> Result<PipeTable, ShellError> {
		let count = stage_count.saturating_sub(1);
		let mut pipes = Vec::with_capacity(count);
		for _ in 0 .. count {
			pipes.push(cloexec_pipe().map_err(ShellError::Pipe)?);
		}
		Ok(PipeTable { pipes: pipes })
	}

	fn stage_count(&self) -> usize {
		self.pipes.len() + 1
	}

	/// Read end feeding stage `i`, if it has a predecessor.
	pub fn stdin_for(&self, i: usize) -> Option<RawFd> {
		if i == 0 { None } else { self.pipes.get(i - 1).map(|p| p.0.as_raw_fd()) }
	}

	/// Write end draining stage `i`, if it has a successor.
	pub fn stdout_for(&self, i: usize) -> Option<RawFd> {
		self.pipes.get(i).map(|p| p.1.as_raw_fd())
	}

	/// Closes every endpoint without giving up ownership. Only for a forked
	/// child that will exec or `_exit` and so never runs the destructors.
	fn close_in_child(&self) {
		for (r, w) in &self.pipes {
			let _ = unistd::close(r.as_raw_fd());
			let _ = unistd::close(w.as_raw_fd());
		}
	}
}

fn dup_onto(fd: RawFd, slot: RawFd) -> Result<(), StageFailure<'static>> {
	unistd::dup2(fd, slot).map(drop).map_err(|errno| StageFailure::Descriptor { errno: errno })
}

/// Everything a child does between `fork` and `exec`. Returns only on failure.
///
/// Pipes are connected first and redirections second, so a redirection wins
/// over the pipe on the same stream.
fn exec_stage<'a>(command: &'a Command, index: usize, pipes: &PipeTable) -> Result<Infallible, StageFailure<'a>> {
	if let Some(fd) = pipes.stdin_for(index) {
		dup_onto(fd, libc::STDIN_FILENO)?;
	}
	if let Some(fd) = pipes.stdout_for(index) {
		dup_onto(fd, libc::STDOUT_FILENO)?;
	}
	pipes.close_in_child();

	command.redirects.open()?.apply()?;

	unsafe {
		let _ = signal::signal(Signal::SIGINT, SigHandler::SigDfl);
	}
	unistd::execvp(command.program(), &command.argv)
		.map_err(|errno| StageFailure::Exec { program: command.program(), errno: errno })
}

/// Forks one stage. The parent gets the child's pid back; the child never
/// returns from here.
pub fn launch(command: &Command, index: usize, pipes: &PipeTable) -> Result<Pid, ShellError> {
	debug_assert!(index < pipes.stage_count());

	match unsafe { unistd::fork() } {
		Ok(ForkResult::Parent { child }) => {
			debug!("stage {} ({:?}) running as pid {}", index, command.program(), child);
			Ok(child)
		},
		Ok(ForkResult::Child) => {
			let failure = match exec_stage(command, index, pipes) {
				Ok(never) => match never {},
				Err(failure) => failure,
			};
			failure.terminate()
		},
		Err(errno) => {
			warn!("fork for stage {} failed: {}", index, errno);
			Err(ShellError::Spawn(errno))
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn single_stage_has_no_pipes() {
		let pipes = PipeTable::create(1).unwrap();
		assert!(pipes.pipes.is_empty());
		assert_eq!(pipes.stdin_for(0), None);
		assert_eq!(pipes.stdout_for(0), None);
	}

	#[test]
	fn endpoints_chain_stages() {
		let pipes = PipeTable::create(3).unwrap();
		assert_eq!(pipes.pipes.len(), 2);
		assert_eq!(pipes.stdin_for(0), None);
		assert_eq!(pipes.stdout_for(0), Some(pipes.pipes[0].1.as_raw_fd()));
		assert_eq!(pipes.stdin_for(1), Some(pipes.pipes[0].0.as_raw_fd()));
		assert_eq!(pipes.stdout_for(1), Some(pipes.pipes[1].1.as_raw_fd()));
		assert_eq!(pipes.stdin_for(2), Some(pipes.pipes[1].0.as_raw_fd()));
		assert_eq!(pipes.stdout_for(2), None);
	}
}
