//! Waymark CLI Entry Point
//!
//! Provides a command-line front end over the workflow tree.
//!
//! # Usage
//!
//! ```bash
//! # Create the default workflow file with sample data
//! waymark init
//!
//! # Show the tree with node paths
//! waymark show
//!
//! # Mark the second step of the first task complete
//! waymark complete-step 0/0/1
//!
//! # Mark the enclosing task of a step complete
//! waymark complete-task 0/0/1
//!
//! # Open a step's address, or a typed address
//! waymark open 0/1/0
//! waymark go example.com
//!
//! # Use another workflow file
//! waymark --file team.json export
//! ```

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use colored::Colorize;
use log::{debug, error, info, warn};

use waymark::config::{self, append_error_log};
use waymark::navigation::{Channel, NavigationReport, Navigator, SystemBrowser};
use waymark::progress::{complete_selected_step, complete_selection};
use waymark::workflow::{NodeRef, Selection, Task, Workflow};
use waymark::{Result, WaymarkError, WorkflowStore, APP_NAME, VERSION};

/// Width of the progress bars printed by `show`.
const BAR_WIDTH: usize = 10;

/// Subcommand selected on the command line.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Init,
    Show,
    CompleteStep(String),
    CompleteTask(String),
    Open(String),
    OpenFirst,
    Go(String),
    Export,
}

/// Command-line configuration parsed from arguments.
#[derive(Debug)]
struct Config {
    workflow_file: Option<PathBuf>,
    command: Option<Command>,
    force: bool,
    verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workflow_file: None,
            command: None,
            force: false,
            verbose: false,
        }
    }
}

impl Config {
    fn workflow_file(&self) -> PathBuf {
        self.workflow_file
            .clone()
            .unwrap_or_else(config::default_workflow_file)
    }
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints usage information.
fn print_usage() {
    println!("{} v{}", APP_NAME, VERSION);
    println!();
    println!("Usage: waymark [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("Commands:");
    println!("  init                 Write the sample workflow to the workflow file");
    println!("  show                 Print the workflow tree with node paths");
    println!("  complete-step PATH   Mark the step at PATH complete");
    println!("  complete-task PATH   Mark the task at PATH (or the task holding the step at PATH) complete");
    println!("  open PATH            Open the address of the step at PATH");
    println!("  open-first           Open the address of the first step");
    println!("  go ADDRESS           Open a typed address (https:// is added if missing)");
    println!("  export               Write the workflow JSON to standard output");
    println!();
    println!("Options:");
    println!("  --file PATH          Workflow file (default: {})", config::default_workflow_file().display());
    println!("  --force              Let init overwrite an existing file");
    println!("  --verbose            Enable debug logging");
    println!("  --help               Show this help message");
    println!("  --version            Show version information");
    println!();
    println!("Paths are zero-based indices: W, W/T or W/T/S (see `waymark show`).");
}

/// Takes the single argument a command requires.
fn command_argument(args: &[String], i: &mut usize, command: &str) -> std::result::Result<String, String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| format!("{} requires an argument", command))
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> std::result::Result<Config, String> {
    let mut config = Config::default();
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--force" => {
                config.force = true;
            }
            "--file" | "-f" => {
                i += 1;
                if i >= args.len() {
                    return Err("--file requires a path argument".to_string());
                }
                config.workflow_file = Some(PathBuf::from(&args[i]));
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            name => {
                if config.command.is_some() {
                    return Err(format!("Unexpected argument: {}", name));
                }

                let command = match name {
                    "init" => Command::Init,
                    "show" => Command::Show,
                    "export" => Command::Export,
                    "open-first" => Command::OpenFirst,
                    "complete-step" => Command::CompleteStep(command_argument(args, &mut i, name)?),
                    "complete-task" => Command::CompleteTask(command_argument(args, &mut i, name)?),
                    "open" => Command::Open(command_argument(args, &mut i, name)?),
                    "go" => Command::Go(command_argument(args, &mut i, name)?),
                    _ => return Err(format!("Unknown command: {}", name)),
                };
                config.command = Some(command);
            }
        }
        i += 1;
    }

    Ok(config)
}

/// Loads the store from `path`; a missing file yields an empty store.
fn load_store(path: &Path) -> Result<WorkflowStore> {
    let mut store = WorkflowStore::new();
    store.notifier().subscribe(|event| debug!("Change: {:?}", event));

    if path.exists() {
        store.load_file(path)?;
    } else {
        warn!(
            "Workflow file {} does not exist; starting empty (run `waymark init` for sample data)",
            path.display()
        );
    }
    Ok(store)
}

/// Resolves a path argument to a selection.
fn select(store: &WorkflowStore, path: &str) -> Result<Selection> {
    store
        .select_path(path)
        .ok_or_else(|| WaymarkError::InvalidSelection(format!("No node at path '{}'", path)))
}

fn progress_bar(progress: f64) -> String {
    let filled = (progress * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "{}{} {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        progress * 100.0
    )
}

/// Summary of completion for a node.
fn describe(node: NodeRef<'_>) -> String {
    match node {
        NodeRef::Workflow(w) => {
            let done = w.tasks().iter().filter(|t| t.is_completed()).count();
            format!("{} ({}/{} tasks complete)", w.name(), done, w.tasks().len())
        }
        NodeRef::Task(t) => format!("{} ({:.0}%)", t.name(), t.progress() * 100.0),
        NodeRef::Step(s) => format!("{} ({:.0}%)", s.name(), s.progress() * 100.0),
    }
}

fn status_marker(is_completed: bool) -> String {
    if is_completed {
        "[x]".green().to_string()
    } else {
        "[ ]".normal().to_string()
    }
}

fn print_task(w: usize, t: usize, task: &Task) {
    println!(
        "  {} {} {} {}",
        format!("{}/{}", w, t).dimmed(),
        status_marker(task.is_completed()),
        task.name().bold(),
        progress_bar(task.progress())
    );

    for (s, step) in task.steps().iter().enumerate() {
        println!(
            "    {} {} {} {} {}",
            format!("{}/{}/{}", w, t, s).dimmed(),
            status_marker(step.is_completed()),
            step.name(),
            progress_bar(step.progress()),
            step.url().cyan()
        );
    }
}

fn print_workflow(w: usize, workflow: &Workflow) {
    println!(
        "{} {}",
        format!("{}", w).dimmed(),
        describe(NodeRef::Workflow(workflow)).bold()
    );
    for (t, task) in workflow.tasks().iter().enumerate() {
        print_task(w, t, task);
    }
}

fn show(store: &WorkflowStore) {
    if store.is_empty() {
        println!("No workflows.");
        return;
    }
    for (w, workflow) in store.workflows().iter().enumerate() {
        print_workflow(w, workflow);
    }
}

/// Where a navigation command should go.
enum Target {
    /// A stored step address, used as is.
    Stored(String),
    /// A typed address, normalized first.
    Typed(String),
}

/// Runs a navigation on a single-threaded runtime and turns an
/// undelivered address into an error.
fn navigate_to(target: Target) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let browser = match config::browser_override() {
        Some(opener) => SystemBrowser::new().with_opener(opener),
        None => SystemBrowser::new(),
    };
    let mut navigator = Navigator::new(browser);

    let report: Option<NavigationReport> = runtime.block_on(async {
        navigator.initialize().await;
        match target {
            Target::Stored(url) => Some(navigator.navigate(&url).await),
            Target::Typed(address) => navigator.go(&address).await,
        }
    });

    let Some(mut report) = report else {
        info!("Nothing to open");
        return Ok(());
    };

    for failure in &report.errors {
        warn!("{}", failure);
        append_error_log(&failure.to_string());
    }

    match report.channel {
        Channel::Engine => info!("Opened {}", report.url),
        Channel::Address => info!("Browser unavailable; address shown above"),
        Channel::None => {
            return Err(report.errors.pop().unwrap_or(WaymarkError::Navigation {
                url: report.url,
                reason: "no channel delivered the address".to_string(),
            }))
        }
    }
    Ok(())
}

/// Main application entry point.
fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        WaymarkError::Config(e)
    })?;

    setup_logging(config.verbose);

    let Some(command) = config.command.clone() else {
        print_usage();
        return Err(WaymarkError::Config("no command given".to_string()));
    };

    let path = config.workflow_file();
    debug!("Workflow file: {}", path.display());

    match command {
        Command::Init => {
            if path.exists() && !config.force {
                return Err(WaymarkError::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            WorkflowStore::sample().save_file(&path)?;
            println!("Workflow saved.");
        }
        Command::Show => show(&load_store(&path)?),
        Command::Export => load_store(&path)?.export_to(io::stdout().lock())?,
        Command::CompleteStep(node) => {
            let mut store = load_store(&path)?;
            let selection = select(&store, &node)?;
            complete_selected_step(store.workflows_mut(), selection)?;
            store.save_file(&path)?;
        }
        Command::CompleteTask(node) => {
            let mut store = load_store(&path)?;
            let selection = select(&store, &node)?;
            complete_selection(store.workflows_mut(), selection)?;
            store.save_file(&path)?;
        }
        Command::Open(node) => {
            let store = load_store(&path)?;
            let selection = select(&store, &node)?;
            let url = match store.find(selection) {
                Some(NodeRef::Step(step)) => step.url().to_string(),
                Some(other) => {
                    info!("Selected {} has no address to open", other);
                    return Ok(());
                }
                None => return Err(WaymarkError::InvalidSelection(format!("No node at path '{}'", node))),
            };
            navigate_to(Target::Stored(url))?;
        }
        Command::OpenFirst => {
            let store = load_store(&path)?;
            let Some(step) = store.first_step() else {
                info!("No steps to open");
                return Ok(());
            };
            let url = step.url().to_string();
            navigate_to(Target::Stored(url))?;
        }
        Command::Go(address) => {
            navigate_to(Target::Typed(address))?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            append_error_log(&e.to_string());
            eprintln!();
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
