//! Command dispatch: parsed arguments to service calls and exit codes

use std::ffi::OsString;
use std::io::Write;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::BuildService;
use crate::cli::args::{Cli, Commands};
use crate::cli::error::CliResult;
use crate::cli::output;
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::CallContext;

/// Parse `args` (including the program name) and dispatch.
///
/// `connect` builds the service container; it is only called once the
/// arguments are known to be valid and a command needs the backend.
/// Returns the process exit code.
pub fn run<I, T, F>(args: I, connect: F, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: FnOnce(&Cli) -> CliResult<ServiceContainer>,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => dispatch(&cli, connect, out, err),
        Err(e) => report_parse_error(&e, out, err),
    }
}

/// Print a clap error. Help and version requests go to `out` and succeed.
pub fn report_parse_error(e: &clap::Error, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = write!(out, "{}", e.render());
            exitcode::OK
        }
        _ => {
            let _ = write!(err, "{}", e.render());
            exitcode::USAGE
        }
    }
}

/// Run an already parsed command line.
pub fn dispatch<F>(cli: &Cli, connect: F, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    F: FnOnce(&Cli) -> CliResult<ServiceContainer>,
{
    let command = match &cli.command {
        Some(Commands::Completion { shell }) => return finish(_completion(*shell, out), err),
        Some(command) => command,
        None => {
            let _ = write!(out, "{}", Cli::command().render_help());
            return exitcode::OK;
        }
    };

    let container = match connect(cli) {
        Ok(container) => container,
        Err(e) => {
            let _ = output::error(err, &format!("initializing service: {}", e));
            return e.exit_code();
        }
    };
    let ctx = container.call_context();

    finish(
        execute_command(command, container.service.as_ref(), &ctx, out),
        err,
    )
}

fn finish(result: CliResult<()>, err: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => exitcode::OK,
        Err(e) => {
            if e.is_not_implemented() {
                let _ = output::notice(err, &e);
            } else {
                let _ = output::error(err, &e);
            }
            e.exit_code()
        }
    }
}

pub fn execute_command(
    command: &Commands,
    service: &dyn BuildService,
    ctx: &CallContext,
    out: &mut dyn Write,
) -> CliResult<()> {
    match command {
        Commands::List { project } => match project.as_deref().filter(|p| !p.is_empty()) {
            Some(project) => _list_builds(service, ctx, project, out),
            None => _list_projects(service, ctx, out),
        },
        Commands::Less { build_id } => _less(service, ctx, build_id, out),
        Commands::Rerun { build_id } => _rerun(service, ctx, build_id, out),
        Commands::Completion { shell } => _completion(*shell, out),
    }
}

#[instrument(skip(service, ctx, out))]
fn _list_projects(
    service: &dyn BuildService,
    ctx: &CallContext,
    out: &mut dyn Write,
) -> CliResult<()> {
    let projects = service.list_projects(ctx)?;
    debug!("projects: {}", projects.len());
    output::lines(out, &projects)?;
    Ok(())
}

#[instrument(skip(service, ctx, out))]
fn _list_builds(
    service: &dyn BuildService,
    ctx: &CallContext,
    project: &str,
    out: &mut dyn Write,
) -> CliResult<()> {
    let builds = service.list_project_builds(ctx, project)?;
    debug!("builds: {}", builds.len());
    output::lines(out, &builds)?;
    Ok(())
}

#[instrument(skip(service, ctx, out))]
fn _less(
    service: &dyn BuildService,
    ctx: &CallContext,
    build_id: &str,
    out: &mut dyn Write,
) -> CliResult<()> {
    let log = service.get_build_log(ctx, build_id)?;
    debug!("log bytes: {}", log.len());
    output::info(out, &log)?;
    Ok(())
}

#[instrument(skip(service, ctx, out))]
fn _rerun(
    service: &dyn BuildService,
    ctx: &CallContext,
    build_id: &str,
    out: &mut dyn Write,
) -> CliResult<()> {
    let new_id = service.rerun_build(ctx, build_id)?;
    output::info(out, &format!("triggered build: {}", new_id))?;
    Ok(())
}

fn _completion(shell: Shell, out: &mut dyn Write) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
    Ok(())
}
