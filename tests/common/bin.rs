use assert_cmd::{assert::Assert, Command};

const TMP_DIR: &str = env!("CARGO_TARGET_TMPDIR");

pub fn input() -> IntegrationInput {
    IntegrationInput {
        debug: false,
        args: vec![],
    }
}

#[derive(Debug)]
pub struct IntegrationInput {
    debug: bool,
    args: Vec<String>,
}

impl IntegrationInput {
    pub fn with_debug(mut self) -> Self {
        self.debug = true;
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Runs the cli against `class` (a name or a path) with the test target dir on the classpath.
pub fn exec_integration(state: IntegrationInput, class: impl Into<String>) -> Assert {
    let mut cargo_cmd = Command::cargo_bin("cli").expect("cargo to locate cli");

    let cmd = cargo_cmd.arg("--cp").arg(TMP_DIR);
    if state.debug {
        cmd.arg("--debug");
    }

    cmd.args(state.args).arg(class.into());
    cmd.assert()
}

/// Runs the cli with exactly `args`.
pub fn exec_raw(args: &[&str]) -> Assert {
    Command::cargo_bin("cli")
        .expect("cargo to locate cli")
        .args(args)
        .assert()
}
