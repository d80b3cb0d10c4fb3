use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use log::debug;
use nix::unistd;

use crate::error::EXIT_FAILURE;
use crate::types::Token;

/// What the shell loop does after a builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
	Continue(i32),
	Exit(i32),
}

pub type Builtin = fn(&[Token]) -> Flow;

fn fail(msg: &str) -> Flow {
	let _ = writeln!(&mut io::stderr(), "{}", msg);
	Flow::Continue(EXIT_FAILURE)
}

pub fn builtin_cd(args: &[Token]) -> Flow {
	let dir = match args {
		[] => match env::var_os("HOME") {
			Some(home) => PathBuf::from(home),
			None => { return fail("cd: HOME not set"); },
		},
		[dir] => PathBuf::from(dir),
		_ => { return fail("cd: wrong number of arguments"); },
	};
	debug!("cd {}", dir.display());
	match unistd::chdir(&dir) {
		Ok(()) => Flow::Continue(0),
		Err(errno) => fail(&format!("cd: {}", errno.desc())),
	}
}

pub fn builtin_pwd(args: &[Token]) -> Flow {
	if !args.is_empty() {
		return fail("pwd: too many arguments");
	}
	match env::current_dir() {
		Ok(dir) => {
			let mut stdout = io::stdout();
			let _ = writeln!(stdout, "{}", dir.display());
			let _ = stdout.flush();
			Flow::Continue(0)
		},
		Err(e) => fail(&format!("pwd: {}", e)),
	}
}

pub fn builtin_exit(args: &[Token]) -> Flow {
	match args {
		[] => Flow::Exit(0),
		[code] => Flow::Exit(parse_status(code)),
		_ => fail("exit: too many arguments"),
	}
}

/// Leading integer of `s` the way C's `atoi` reads it; 0 when there is none.
pub fn parse_status(s: &str) -> i32 {
	let s = s.trim_start();
	let (negative, digits) = match s.as_bytes().first() {
		Some(b'-') => (true, &s[1..]),
		Some(b'+') => (false, &s[1..]),
		_ => (false, s),
	};
	let value = digits.bytes()
		.take_while(u8::is_ascii_digit)
		.fold(0i32, |acc, d| acc.wrapping_mul(10).wrapping_add((d - b'0') as i32));
	if negative { value.wrapping_neg() } else { value }
}

pub fn match_builtin(name: &str) -> Option<Builtin> {
	match name {
		"cd" => Some(builtin_cd),
		"pwd" => Some(builtin_pwd),
		"exit" => Some(builtin_exit),
		_ => None,
	}
}
