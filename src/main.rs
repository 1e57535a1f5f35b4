use std::io::{self, Read};

use anyhow::{anyhow, bail, Result};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

use pyrun::bootstrap::Bootstrapper;
use pyrun::cli::Cli;
use pyrun::config::Config;
use pyrun::execution::error_display;
use pyrun::printer::ResultPrinter;
use pyrun::process::python::PythonLoader;
use pyrun::tui::{handler::PlaygroundOptions, run_playground};
use pyrun::{logging, utils};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // CLI overrides config
    let mut cfg = Config::load();
    if let Some(python) = &args.python {
        cfg.set("PYTHON_EXECUTABLE", python.as_str());
    }
    if !args.core.is_empty() {
        cfg.set("CORE_PACKAGES", args.core.join(","));
    }
    if !args.packages.is_empty() {
        cfg.set("EXTRA_PACKAGES", args.packages.join(","));
    }
    if let Some(module) = &args.verify {
        cfg.set("VERIFY_PACKAGE", module.as_str());
    }
    if args.best_effort_core {
        cfg.set("STRICT_CORE_PACKAGES", "false");
    }

    logging::init_tracing(&cfg.log_path());

    let stdin_is_tty = io::stdin().is_terminal();
    let source = if let Some(code) = args.code.clone() {
        Some(code)
    } else if let Some(file) = &args.file {
        Some(utils::read_source_file(file)?)
    } else if !stdin_is_tty || args.no_tui {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Some(buf)
    } else {
        None
    };

    match source {
        Some(code) => run_once(&cfg, &code, !args.no_color && io::stdout().is_terminal()).await,
        None => {
            run_playground(PlaygroundOptions {
                packages: cfg.packages(),
                policy: cfg.core_policy(),
                executable: cfg.python_executable(),
                snippet: cfg.default_snippet(),
            })
            .await
        }
    }
}

/// Bootstrap, run one snippet, print the result.
async fn run_once(cfg: &Config, code: &str, color: bool) -> Result<()> {
    if code.trim().is_empty() {
        bail!("no Python source given (use --code, a FILE argument or stdin)");
    }

    let (boot, mut progress) = Bootstrapper::new(cfg.packages(), cfg.core_policy());
    let progress_task = io::stderr().is_terminal().then(|| {
        // Ends once the bootstrapper (and its sender) is dropped and the last value is printed.
        tokio::spawn(async move {
            while progress.changed().await.is_ok() {
                let p = progress.borrow_and_update().clone();
                eprintln!("{}", format!("[{:>3}%] {}", p.percent, p.status).dimmed());
            }
        })
    });

    let booted = boot.run(PythonLoader::new(cfg.python_executable())).await;
    if let Some(task) = progress_task {
        let _ = task.await;
    }
    let ready = booted.map_err(|e| anyhow!("could not start Python: {e}"))?;
    let printer = ResultPrinter { color };
    if !ready.skipped.is_empty() {
        printer.print_error(&format!("warning: could not install {}", ready.skipped.join(", ")));
    }
    if let Some(warning) = &ready.warning {
        printer.print_error(&format!("warning: {warning}"));
    }

    let outcome = ready.session.run(code).await;
    ready.session.into_engine().shutdown().await;

    match outcome {
        Ok(result) => {
            printer.print(&result);
            Ok(())
        }
        Err(e) => {
            printer.print_error(&error_display(&e));
            std::process::exit(1);
        }
    }
}
