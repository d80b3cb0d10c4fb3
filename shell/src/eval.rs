use std::io::{self, Write};

use log::debug;

use crate::error::{ShellError, EXIT_FAILURE};
use crate::job::{Job, Process, State};
use crate::launch::{self, PipeTable};
use crate::pipeline;
use crate::redirect;
use crate::types::{Command, Token};

#[derive(Debug)]
pub struct PipelineResult {
	pub status: i32,
	pub processes: Vec<Process>,
}

fn spawn_commands(commands: &[Command], pipes: &PipeTable, job: &mut Job) -> Result<(), ShellError> {
	for (i, command) in commands.iter().enumerate() {
		job.push(launch::launch(command, i, pipes)?);
	}
	Ok(())
}

/// Splits, scans and runs one command line, then reaps every stage.
///
/// Syntax errors surface before anything is forked. A fork failure stops
/// further spawning but the stages already running are still reaped before
/// the error is returned.
///
/// An empty token list runs nothing and succeeds, like a blank line.
pub fn execute(tokens: Vec<Token>) -> Result<PipelineResult, ShellError> {
	if tokens.is_empty() {
		return Ok(PipelineResult { status: 0, processes: vec![] });
	}
	let pipeline = pipeline::split(tokens)?;
	let commands = pipeline.stages.into_iter()
		.map(redirect::scan)
		.collect::<Result<Vec<Command>, ShellError>>()?;

	let pipes = PipeTable::create(commands.len())?;
	let mut job = Job::new(commands.len());
	let spawned = spawn_commands(&commands, &pipes, &mut job);
	drop(pipes);

	job.wait();
	debug_assert_eq!(job.state(), State::Terminated);
	spawned?;

	let status = job.code().unwrap_or(EXIT_FAILURE);
	debug!("pipeline of {} stage(s) finished with {}", job.processes.len(), status);
	Ok(PipelineResult { status: status, processes: job.processes })
}

/// Runs one command line and returns its aggregate status, reporting any
/// error on standard error.
pub fn eval(tokens: Vec<Token>) -> i32 {
	let _ = io::stdout().flush();
	match execute(tokens) {
		Ok(result) => result.status,
		Err(e) => {
			let _ = writeln!(&mut io::stderr(), "{}", e);
			EXIT_FAILURE
		},
	}
}
