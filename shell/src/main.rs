use std::fs::File;
use std::io::{self, BufReader, IsTerminal, Write};
use std::path::PathBuf;
use std::process;

use argh::FromArgs;
use nix::errno::Errno;
use simplelog::LevelFilter;

use pipesh::{logging, Shell};

#[derive(FromArgs)]
/// Run commands from a script, or from standard input.
struct Args {
	/// script to read commands from; standard input when omitted
	#[argh(positional)]
	script: Option<PathBuf>,

	/// append debug records to this file
	#[argh(option)]
	log_file: Option<PathBuf>,

	/// log level for --log-file (off, error, warn, info, debug, trace)
	#[argh(option, default = "LevelFilter::Info")]
	log_level: LevelFilter,
}

fn open_reason(e: &io::Error) -> String {
	match e.raw_os_error() {
		Some(raw) => Errno::from_raw(raw).desc().to_string(),
		None => e.to_string(),
	}
}

fn run(args: Args) -> anyhow::Result<i32> {
	logging::init(args.log_file.as_deref(), args.log_level)?;
	let mut shell = Shell::new();
	match args.script {
		Some(path) => {
			let file = match File::open(&path) {
				Ok(file) => file,
				Err(e) => {
					let _ = writeln!(&mut io::stderr(), "{}: {}", path.display(), open_reason(&e));
					return Ok(1);
				},
			};
			Ok(shell.run_script(BufReader::new(file))?)
		},
		None if io::stdin().is_terminal() => shell.run_interactive(),
		None => Ok(shell.run_script(io::stdin().lock())?),
	}
}

fn main() {
	let args: Args = argh::from_env();
	let code = run(args).unwrap_or_else(|e| {
		let _ = writeln!(&mut io::stderr(), "pipesh: {:#}", e);
		1
	});
	let _ = io::stdout().flush();
	process::exit(code)
}
