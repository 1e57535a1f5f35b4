use clap::{ArgGroup, Parser};

#[derive(Parser, Debug, Clone)]
#[command(name = "pyrun", about = "Run Python snippets in an embedded interpreter session", version)]
#[command(group(ArgGroup::new("source").args(["file", "code"]).multiple(false)))]
pub struct Cli {
    /// Python file to run once and exit.
    #[arg(value_name = "FILE")]
    pub file: Option<String>,

    /// Python source to run once and exit.
    #[arg(short = 'c', long)]
    pub code: Option<String>,

    /// Interpreter executable (name on PATH or full path).
    #[arg(long)]
    pub python: Option<String>,

    /// Core package loaded before the installer. Can be repeated.
    ///
    /// Overrides CORE_PACKAGES from the config file.
    #[arg(long = "core", action = clap::ArgAction::Append)]
    pub core: Vec<String>,

    /// Package installed with pip; failures are logged and skipped. Can be repeated.
    ///
    /// Overrides EXTRA_PACKAGES from the config file.
    #[arg(short = 'p', long = "package", action = clap::ArgAction::Append)]
    pub packages: Vec<String>,

    /// Module whose import is checked once packages are installed.
    #[arg(long)]
    pub verify: Option<String>,

    /// Keep going when a core package fails to load.
    #[arg(long = "best-effort-core")]
    pub best_effort_core: bool,

    /// Never start the interactive playground; read source from stdin instead.
    #[arg(long = "no-tui")]
    pub no_tui: bool,

    /// Disable colored output in one-shot mode.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
