use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

use crate::config::{Backend, CommandSpec, ContainerSpec, RunConfiguration};

/// A fully spelled-out external command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
}

impl Invocation {
    /// Command line that runs the engine against `working_path` with the configured backend
    pub fn for_unit(config: &RunConfiguration, working_path: &Path) -> Self {
        match config.backend() {
            Backend::Local => Self::local(config.command(), working_path),
            Backend::Container(spec) => Self::container(spec, config.command(), working_path),
        }
    }

    /// `[interpreter] <script> <path>`
    fn local(command: &CommandSpec, working_path: &Path) -> Self {
        let mut args = Vec::new();
        let program = match &command.interpreter {
            Some(interpreter) => {
                args.push(command.script.clone().into_os_string());
                OsString::from(interpreter)
            }
            None => command.script.clone().into_os_string(),
        };
        args.push(working_path.as_os_str().to_owned());

        Self { program, args }
    }

    /// `<runtime> run --rm [--platform P] -v <host>:<mount> <image> [interpreter] <script> <mount>`
    fn container(spec: &ContainerSpec, command: &CommandSpec, working_path: &Path) -> Self {
        // Bind mounts need an absolute host path
        let host_path: PathBuf =
            std::path::absolute(working_path).unwrap_or_else(|_| working_path.to_path_buf());

        let mut args: Vec<OsString> = vec!["run".into(), "--rm".into()];
        if !spec.platform.is_empty() {
            args.push("--platform".into());
            args.push(spec.platform.as_str().into());
        }

        let mut volume = host_path.into_os_string();
        volume.push(":");
        volume.push(&spec.mount_point);
        args.push("-v".into());
        args.push(volume);

        args.push(spec.image.as_str().into());
        if let Some(interpreter) = &command.interpreter {
            args.push(interpreter.into());
        }
        args.push(command.script.clone().into_os_string());
        args.push(spec.mount_point.as_str().into());

        Self {
            program: OsString::from(&spec.runtime),
            args,
        }
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Locate the program on PATH (or relative to the working directory)
    pub fn resolve_program(&self) -> Result<PathBuf> {
        which::which(&self.program).with_context(|| {
            format!("Program not found: {}", self.program.to_string_lossy())
        })
    }

    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }

    /// Shell-like rendering for logs and dry runs
    pub fn render(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| {
                let part = part.to_string_lossy();
                if part.is_empty() || part.contains(char::is_whitespace) {
                    format!("'{}'", part)
                } else {
                    part.into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_invocation_with_interpreter() {
        let config = RunConfiguration::builder().build().unwrap();
        let invocation = Invocation::for_unit(&config, Path::new("data/subject01"));

        assert_eq!(invocation.render(), "python3 engine/src/engine.py data/subject01");
    }

    #[test]
    fn test_local_invocation_runs_script_directly() {
        let config = RunConfiguration::builder()
            .interpreter("")
            .script("./bin/engine")
            .build()
            .unwrap();
        let invocation = Invocation::for_unit(&config, Path::new("/data/s1"));

        assert_eq!(invocation.program(), &OsString::from("./bin/engine"));
        assert_eq!(invocation.args(), &[OsString::from("/data/s1")]);
    }

    #[test]
    fn test_container_invocation_binds_absolute_path() {
        let config = RunConfiguration::builder()
            .docker(true)
            .image("example/engine:1")
            .build()
            .unwrap();
        let invocation = Invocation::for_unit(&config, Path::new("/srv/data/subject01"));

        assert_eq!(
            invocation.render(),
            "docker run --rm --platform linux/amd64 -v /srv/data/subject01:/test_data \
             example/engine:1 python3 engine/src/engine.py /test_data"
        );
    }

    #[test]
    fn test_container_invocation_absolutizes_relative_paths() {
        let config = RunConfiguration::builder().docker(true).build().unwrap();
        let invocation = Invocation::for_unit(&config, Path::new("results/X_original/X"));

        let volume = invocation.args()[5].to_string_lossy().into_owned();
        assert!(Path::new(&volume).is_absolute());
        assert!(volume.ends_with("results/X_original/X:/test_data"));
    }

    #[test]
    fn test_render_quotes_whitespace() {
        let config = RunConfiguration::builder().build().unwrap();
        let invocation = Invocation::for_unit(&config, Path::new("my data/subject 1"));

        assert!(invocation.render().ends_with("'my data/subject 1'"));
    }

    #[test]
    fn test_missing_program_is_reported() {
        let config = RunConfiguration::builder()
            .interpreter("definitely-not-a-real-program-batchrun")
            .build()
            .unwrap();
        let invocation = Invocation::for_unit(&config, Path::new("data"));

        let err = invocation.resolve_program().unwrap_err();
        assert!(err.to_string().contains("Program not found"));
    }
}
