use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};

fn pipesh(script: &str) -> Output {
	pipesh_bytes(script.as_bytes())
}

fn pipesh_bytes(script: &[u8]) -> Output {
	let mut child = Command::new(env!("CARGO_BIN_EXE_pipesh"))
		.stdin(Stdio::piped())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.spawn()
		.unwrap();
	child.stdin.take().unwrap().write_all(script).unwrap();
	child.wait_with_output().unwrap()
}

fn stdout(o: &Output) -> String {
	String::from_utf8_lossy(&o.stdout).into_owned()
}

fn stderr(o: &Output) -> String {
	String::from_utf8_lossy(&o.stderr).into_owned()
}

#[test]
fn no_prompt_without_terminal() {
	let o = pipesh("echo hello\n");
	assert_eq!(stdout(&o), "hello\n");
	assert!(o.status.success());
}

#[test]
fn invalid_utf8_line_keeps_running() {
	let o = pipesh_bytes(b"echo caf\xe9\necho after\n");
	assert_eq!(stdout(&o), "caf\u{fffd}\nafter\n");
	assert!(o.status.success());
}

#[test]
fn pipeline_output() {
	let o = pipesh("echo one two three | wc -w\n");
	assert_eq!(stdout(&o).trim(), "3");
}

#[test]
fn last_status_substitution() {
	let o = pipesh("false\necho $?\ntrue\necho $?\nno-such-program-pipesh\necho $?\n");
	assert_eq!(stdout(&o), "1\n0\n127\n");
	assert_eq!(stderr(&o), "no-such-program-pipesh: No such file or directory\n");
}

#[test]
fn syntax_diagnostics() {
	let o = pipesh("| ls\nls |\n< in cat\ncat >\necho $?\n");
	assert_eq!(stderr(&o), "syntax error: missing command before pipe\n\
		syntax error: missing command after pipe\n\
		syntax error: missing command before <\n\
		syntax error: missing filename after redirect\n");
	assert_eq!(stdout(&o), "1\n");
	assert!(o.status.success());
}

#[test]
fn file_error_diagnostic() {
	let dir = tempfile::tempdir().unwrap();
	let missing = dir.path().join("missing.txt");
	let o = pipesh(&format!("cat < {}\necho $?\n", missing.display()));
	assert_eq!(stderr(&o), format!("{}: No such file or directory\n", missing.display()));
	assert_eq!(stdout(&o), "1\n");
}

#[test]
fn exit_builtin_sets_process_status() {
	let o = pipesh("echo before\nexit 3\necho after\n");
	assert_eq!(stdout(&o), "before\n");
	assert_eq!(o.status.code(), Some(3));
}

#[test]
fn exit_too_many_arguments() {
	let o = pipesh("exit 1 2\necho $?\n");
	assert_eq!(stderr(&o), "exit: too many arguments\n");
	assert_eq!(stdout(&o), "1\n");
	assert_eq!(o.status.code(), Some(0));
}

#[test]
fn cd_and_pwd() {
	let dir = tempfile::tempdir().unwrap();
	let dir = fs::canonicalize(dir.path()).unwrap();
	let o = pipesh(&format!("cd {}\npwd\necho made > f.txt\ncat f.txt\npwd extra\necho $?\n", dir.display()));
	assert_eq!(stdout(&o), format!("{}\nmade\n1\n", dir.display()));
	assert_eq!(stderr(&o), "pwd: too many arguments\n");
	assert!(dir.join("f.txt").exists());
}

#[test]
fn cd_failure() {
	let o = pipesh("cd /no/such/dir/pipesh\necho $?\ncd a b\n");
	assert_eq!(stderr(&o), "cd: No such file or directory\ncd: wrong number of arguments\n");
	assert_eq!(stdout(&o), "1\n");
}

#[test]
fn script_argument() {
	let dir = tempfile::tempdir().unwrap();
	let script = dir.path().join("script.sh");
	fs::write(&script, "echo from script\nexit 5\n").unwrap();
	let o = Command::new(env!("CARGO_BIN_EXE_pipesh")).arg(&script).output().unwrap();
	assert_eq!(stdout(&o), "from script\n");
	assert_eq!(o.status.code(), Some(5));
}

#[test]
fn missing_script() {
	let dir = tempfile::tempdir().unwrap();
	let script = dir.path().join("nope.sh");
	let o = Command::new(env!("CARGO_BIN_EXE_pipesh")).arg(&script).output().unwrap();
	assert_eq!(stderr(&o), format!("{}: No such file or directory\n", script.display()));
	assert_eq!(o.status.code(), Some(1));
}

#[test]
fn log_file_records_pipeline() {
	let dir = tempfile::tempdir().unwrap();
	let log = dir.path().join("pipesh.log");
	let mut child = Command::new(env!("CARGO_BIN_EXE_pipesh"))
		.arg("--log-file").arg(&log)
		.arg("--log-level").arg("debug")
		.stdin(Stdio::piped())
		.stdout(Stdio::null())
		.spawn()
		.unwrap();
	child.stdin.take().unwrap().write_all(b"echo a | cat\n").unwrap();
	assert!(child.wait().unwrap().success());
	let text = fs::read_to_string(&log).unwrap();
	assert!(text.contains("split command line into 2 stage(s)"), "{}", text);
}
