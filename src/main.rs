//! `shellout` runs a command like a shell script would and exits with its exit code.

use clap::Parser;
use miette::IntoDiagnostic;
use shellout::cli;
use shellout::TracingOpts;

#[tokio::main]
async fn main() -> miette::Result<()> {
    miette::set_panic_hook();
    let mut opts = cli::Opts::parse();
    opts.init();
    let guard = TracingOpts::from_cli(&opts).install()?;

    let command = opts.command();
    if opts.print {
        println!("{}", command.serialize());
        return Ok(());
    }

    let context = opts.context()?;
    for binary in &opts.require {
        context.must_command_exist(binary);
    }
    let mut result = opts.must_launch(&context, &*command).await;

    if opts.detach {
        ::tracing::info!(pid = result.pid(), "Started detached process");
        tokio::select! {
            waited = result.wait() => waited?,
            interrupted = tokio::signal::ctrl_c() => {
                interrupted.into_diagnostic()?;
                ::tracing::info!("Interrupted, killing process group");
                result.kill()?;
                result.wait().await?;
            }
        }
    }

    ::tracing::debug!(state = result.state_string(), "Finished");
    let code = result.exit_code()?;

    // `exit` skips destructors, so flush the JSON log first.
    drop(guard);
    std::process::exit(code);
}
