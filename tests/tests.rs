// SPDX-License-Identifier: MPL-2.0

use std::cell::RefCell;
use std::error::Error;
use std::path::{Path, PathBuf};

use composer_dry_run::command::{CommandRunner, ComposerCommand, SHOW, UPDATE};
use composer_dry_run::dry_run::{run_update_dry_run, RequireUpdateDryRun};
use composer_dry_run::error::{ComposerError, Phase};
use composer_dry_run::info::fetch_info;

const UNRESOLVABLE: &str = "Loading composer repositories with package information
Updating dependencies (including require-dev)
Your requirements could not be resolved to an installable set of packages.

  Problem 1
    - 3rdp/e 1.0.0 requires 3rdp/d 1.0.0 -> no matching package found.
    - 3rdp/e 1.0.0 requires 3rdp/d 1.0.0 -> no matching package found.
    - 3rdp/e 1.0.0 requires 3rdp/d 1.0.0 -> no matching package found.
    - Installation request for 3rdp/e 1.0.0 -> satisfiable by 3rdp/e[1.0.0].

Potential causes:
 - A typo in the package name
 - The package is not available in a stable-enough version according to your minimum-stability setting
   see <https://groups.google.com/d/topic/composer-dev/_g3ASeIFlrc/discussion> for more details.

Read <https://getcomposer.org/doc/articles/troubleshooting.md> for further common problems.";

const SHOW_D: &str = "name     : 3rdp/d
descrip. : Plugin project A
keywords :
versions : * 1.0.0, 1.1.0, 1.2.0
type     : library
names    : 3rdp/d
";

/// Runner answering from a script and recording every command it receives.
struct ScriptedRunner<F> {
    script: F,
    calls: RefCell<Vec<(String, Option<PathBuf>)>>,
}

impl<F> ScriptedRunner<F>
where
    F: Fn(&ComposerCommand) -> Result<String, ComposerError>,
{
    fn new(script: F) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            script,
            calls: RefCell::new(Vec::new()),
        }
    }

    fn commands(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(c, _)| c.clone()).collect()
    }
}

impl<F> CommandRunner for ScriptedRunner<F>
where
    F: Fn(&ComposerCommand) -> Result<String, ComposerError>,
{
    fn run(
        &self,
        command: &ComposerCommand,
        working_dir: Option<&Path>,
    ) -> Result<String, ComposerError> {
        self.calls
            .borrow_mut()
            .push((command.to_string(), working_dir.map(Path::to_path_buf)));
        (self.script)(command)
    }
}

fn failed(command: &ComposerCommand, output: &str) -> ComposerError {
    ComposerError::CommandFailed {
        command: command.name().to_owned(),
        output: output.to_owned(),
        code: Some(2),
    }
}

#[test]
fn successful_dry_run_returns_output_unchanged() {
    let runner = ScriptedRunner::new(|command| match command.name() {
        UPDATE => Ok("Nothing to install or update\n".to_owned()),
        _ => Ok(String::new()),
    });
    let output = run_update_dry_run(&runner, Vec::<String>::new(), None).unwrap();
    assert_eq!(output, "Nothing to install or update\n");
    assert_eq!(runner.commands(), ["require --no-update", "update --dry-run"]);
}

#[test]
fn conflict_is_explained() {
    let runner = ScriptedRunner::new(|command| match command.name() {
        UPDATE => Err(failed(command, UNRESOLVABLE)),
        SHOW => Ok(SHOW_D.to_owned()),
        _ => Ok(String::new()),
    });
    let err = run_update_dry_run(&runner, ["3rdp/e 1.2.0"], None).unwrap_err();

    let original = format!("Command \"update\" failed: {}", UNRESOLVABLE);
    let explanation = "You are trying to update package(s) 3rdp/e to 1.2.0\n\
                       But looks like it conflicts with the following packages:\n \
                       - 3rdp/d version 1.0.0 please try to upgrade it to one of the following package versions: 1.1.0, 1.2.0\n";
    let message = err.to_string();
    assert!(message.starts_with(explanation));
    assert!(message.ends_with(&original));
    assert_eq!(message, format!("{}\n{}", explanation, original));

    assert!(matches!(
        err,
        ComposerError::DryRunFailed {
            phase: Phase::Update,
            ..
        }
    ));
    assert_eq!(err.code(), Some(2));
    let source = err.source().expect("original failure is kept");
    assert_eq!(source.to_string(), original);

    assert_eq!(
        runner.commands(),
        ["require 3rdp/e 1.2.0 --no-update", "update --dry-run", "show 3rdp/d"]
    );
}

#[test]
fn unexplained_failure_keeps_original_message() {
    let runner = ScriptedRunner::new(|command| match command.name() {
        UPDATE => Err(failed(
            command,
            "The \"https://repo.example.com/packages.json\" file could not be downloaded",
        )),
        _ => Ok(String::new()),
    });
    let err = run_update_dry_run(&runner, ["3rdp/e 1.2.0"], None).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Command \"update\" failed: The \"https://repo.example.com/packages.json\" file could not be downloaded"
    );
    assert_eq!(runner.commands().len(), 2);
}

#[test]
fn failing_require_is_attributed() {
    let runner = ScriptedRunner::new(|command| Err(failed(command, UNRESOLVABLE)));
    let err = RequireUpdateDryRun::new(&runner)
        .stage(["3rdp/e 1.2.0"], None)
        .unwrap_err();
    assert!(matches!(
        err,
        ComposerError::DryRunFailed {
            phase: Phase::Require,
            ..
        }
    ));
    // The show lookup failed as well, so no candidate is listed.
    let blocker =
        " - 3rdp/d version 1.0.0 please try to upgrade it to one of the following package versions: \n";
    assert!(err.to_string().contains(blocker));
    assert_eq!(
        runner.commands(),
        ["require 3rdp/e 1.2.0 --no-update", "show 3rdp/d"]
    );
}

#[test]
fn staged_requirement_keeps_scope() {
    let runner = ScriptedRunner::new(|_| Ok(String::new()));
    let dry_run = RequireUpdateDryRun::new(&runner);
    let project = Path::new("/srv/shop");

    let staged = dry_run.stage(["a/a 1.0", "b/b ^2.0"], Some(project)).unwrap();
    assert_eq!(staged.packages(), ["a/a 1.0", "b/b ^2.0"]);
    assert_eq!(staged.working_dir(), Some(project));
    staged.update().unwrap();

    for (_, working_dir) in runner.calls.borrow().iter() {
        assert_eq!(working_dir.as_deref(), Some(project));
    }
}

#[test]
fn diagnostics_run_in_the_same_directory() {
    let runner = ScriptedRunner::new(|command| match command.name() {
        UPDATE => Err(failed(command, UNRESOLVABLE)),
        SHOW => Ok(SHOW_D.to_owned()),
        _ => Ok(String::new()),
    });
    let project = Path::new("/srv/shop");
    let _ = run_update_dry_run(&runner, ["3rdp/e 1.2.0"], Some(project));
    let calls = runner.calls.borrow();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|(_, dir)| dir.as_deref() == Some(project)));
}

#[test]
fn same_result_on_repeated_runs() {
    let runner = ScriptedRunner::new(|command| match command.name() {
        UPDATE => Err(failed(command, UNRESOLVABLE)),
        SHOW => Ok(SHOW_D.to_owned()),
        _ => Ok(String::new()),
    });
    let one = run_update_dry_run(&runner, ["3rdp/e 1.2.0"], None).unwrap_err();
    for _ in 0..10 {
        let other = run_update_dry_run(&runner, ["3rdp/e 1.2.0"], None).unwrap_err();
        assert_eq!(one.to_string(), other.to_string());
    }
}

#[test]
fn info_is_best_effort() {
    let runner = ScriptedRunner::new(|command| match command.name() {
        "info" => Ok(SHOW_D.to_owned()),
        _ => Err(failed(command, "")),
    });
    let info = fetch_info(&runner, "3rdp/d", true, None).unwrap();
    assert_eq!(info.name(), "3rdp/d");
    assert_eq!(info.current_version, "1.0.0");
    assert_eq!(info.available_versions, ["1.1.0", "1.2.0"]);
    assert_eq!(runner.commands(), ["info 3rdp/d -i"]);

    let failing = ScriptedRunner::new(|command| Err(failed(command, "not found")));
    assert!(fetch_info(&failing, "3rdp/d", false, None).is_none());
}
