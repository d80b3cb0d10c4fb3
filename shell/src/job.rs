use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::error::EXIT_FAILURE;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum State { Active, Stopped, Terminated }

pub trait WaitStatusExt {
	fn state(self) -> State;
	fn code(self) -> Option<i32>;
}

impl WaitStatusExt for WaitStatus {
	fn state(self) -> State {
		match self {
			WaitStatus::Exited(..) | WaitStatus::Signaled(..) => State::Terminated,
			WaitStatus::Stopped(..) => State::Stopped,
			#[cfg(any(target_os = "linux", target_os = "android"))]
			WaitStatus::PtraceEvent(..) | WaitStatus::PtraceSyscall(..) => State::Stopped,
			WaitStatus::Continued(..) | WaitStatus::StillAlive => State::Active,
		}
	}

	/// Shell-style status of a terminated process: the exit code, or
	/// 128 plus the signal number.
	fn code(self) -> Option<i32> {
		match self {
			WaitStatus::Exited(_, code) => Some(code),
			WaitStatus::Signaled(_, signal, _) => Some(128 + signal as i32),
			_ => None,
		}
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Process {
	pub pid: Pid,
	pub status: WaitStatus,
}

impl Process {
	/// Blocks until the process exits or is killed. Stop and continue
	/// notifications are recorded and waited past.
	fn wait(&mut self) -> nix::Result<()> {
		while self.status.state() != State::Terminated {
			match wait::waitpid(self.pid, Some(WaitPidFlag::WUNTRACED)) {
				Ok(status) => {
					debug!("pid {}: {:?}", self.pid, status);
					self.status = status;
				},
				Err(Errno::EINTR) => {},
				Err(e) => { return Err(e); },
			}
		}
		Ok(())
	}
}

/// The processes of one pipeline, in stage order.
#[derive(Debug)]
pub struct Job {
	pub processes: Vec<Process>,
}

impl Job {
	pub fn new(size_hint: usize) -> Job {
		Job { processes: Vec::with_capacity(size_hint) }
	}

	pub fn push(&mut self, pid: Pid) {
		self.processes.push(Process { pid: pid, status: WaitStatus::StillAlive });
	}

	pub fn state(&self) -> State {
		self.processes.iter().map(|pr| pr.status.state()).min().unwrap_or(State::Terminated)
	}

	/// Reaps every process. A process that cannot be waited for (`ECHILD`)
	/// is abandoned so the others are still reaped.
	pub fn wait(&mut self) {
		for pr in self.processes.iter_mut() {
			if let Err(e) = pr.wait() {
				warn!("waitpid {} failed: {}", pr.pid, e);
				pr.status = WaitStatus::Exited(pr.pid, EXIT_FAILURE);
			}
		}
	}

	/// Status of the last stage, which is the status of the whole pipeline.
	pub fn code(&self) -> Option<i32> {
		self.processes.last().and_then(|pr| pr.status.code())
	}
}
