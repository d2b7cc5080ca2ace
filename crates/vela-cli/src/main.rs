use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

/// Vela language-service integration core: source maps, module resolution,
/// and a virtual-file LSP host for a SRC-to-TGT transpiler toolchain.
///
/// EXAMPLES:
///     vela check main.vela         Smoke-test a transpiler over a file
///     vela lsp                     Start the language server (stdio)
///     vela lsp --tcp --port=8080   Start the language server over TCP
///
/// ENVIRONMENT VARIABLES:
///     VELA_DIAGNOSTICS=json  Default to JSON diagnostic output
///     NO_COLOR               Disable colored output
#[derive(Parser)]
#[command(name = "vela")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the registered transpiler over a source file and report diagnostics
    ///
    /// Not a type-checker: this drives whichever `Transpiler` is registered
    /// (the built-in echo transpiler by default) to smoke-test the
    /// caching/diagnostic pipeline outside an editor.
    ///
    /// EXAMPLES:
    ///     vela check main.vela         Check for errors
    ///     vela check main.vela --json  Output as JSON
    #[command(visible_alias = "c")]
    Check {
        /// Path to the Vela source file
        file: String,
        /// Output diagnostics in JSON format
        #[arg(long, env = "VELA_DIAGNOSTICS")]
        json: bool,
    },

    /// Start the Vela Language Server
    ///
    /// Runs the Language Server Protocol server for IDE integration.
    /// Supports both stdio mode (for editors) and TCP mode.
    ///
    /// EXAMPLES:
    ///     vela lsp                       Start in stdio mode
    ///     vela lsp --tcp                 Start TCP server
    ///     vela lsp --tcp --port=8080     Custom port
    ///     vela lsp --verbose             Enable logging
    Lsp {
        /// Use TCP mode instead of stdio
        #[arg(long)]
        tcp: bool,
        /// Port for TCP mode
        #[arg(long, default_value = "9257")]
        port: u16,
        /// Bind address for TCP mode
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Enable verbose logging
        #[arg(long, short = 'v')]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cli_config = config::Config::from_env();

    match cli.command {
        Commands::Check { file, json } => {
            let use_json = json || cli_config.default_json;
            commands::check::run(&file, use_json)?;
        }
        Commands::Lsp {
            tcp,
            port,
            host,
            verbose,
        } => {
            let args = commands::lsp::LspArgs {
                tcp,
                port,
                host,
                verbose,
            };
            commands::lsp::run(args)?;
        }
    }

    Ok(())
}
