//! envplate's main application entry point.
//! Parses the command line, loads the workspace once and dispatches to the
//! selected command.

use envplate::{
    build::{build_binaries, build_images},
    cli::{get_args, Args, BuildTarget, Commands, GenerateTarget},
    error::{default_error_handler, Result},
    generate::{generate_configs, generate_kubernetes},
    info::BuildInfo,
    init::init_project,
    logger::init_logger,
    runner::SystemRunner,
    workspace::Workspace,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Loads the descriptor and resolves the selected environment
/// 2. Runs the requested command against that workspace
fn run(args: Args) -> Result<()> {
    let ws = Workspace::load(&args.config, &args.environment, &args.filter)?;
    let runner = SystemRunner;

    match args.command {
        Commands::Init => init_project(&ws, &runner),
        Commands::Build { target: BuildTarget::Binary(binary) } => {
            let info = BuildInfo::collect(&ws, &binary.overrides());
            build_binaries(&ws, &runner, &info, binary.output.as_deref())
        }
        Commands::Build { target: BuildTarget::Image { push } } => build_images(&ws, &runner, push),
        Commands::Generate { prefix, target: GenerateTarget::Config { output } } => {
            generate_configs(&ws, &prefix, output.as_deref())
        }
        Commands::Generate { prefix, target: GenerateTarget::Kubernetes { output } } => {
            generate_kubernetes(&ws, &prefix, output.as_deref())
        }
    }
}
