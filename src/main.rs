use clap::Parser;
use hh_c2t::clipboard::copy_to_clipboard;
use hh_c2t::filter::{parse_extensions, FileFilter, DEFAULT_IGNORE_FILE};
use hh_c2t::logger::initialize_logger;
use hh_c2t::reporting::print_stats;
use hh_c2t::{dispatch, CollectError};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Collect and format file contents from a local directory, a git
/// repository or an SSH host.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Local directory, git URL, or SSH address (username@hostname[:port])
    source: String,
    /// Remote path, required when the source is an SSH address
    ssh_path: Option<String>,
    #[arg(long, env = "HH_C2T_PASSWORD", hide_env_values = true, help = "SSH password")]
    password: Option<String>,
    #[arg(long, help = "Do not copy the result to the clipboard")]
    no_clipboard: bool,
    #[arg(long, default_value = DEFAULT_IGNORE_FILE, help = "Path to ignore file")]
    ignore_file: PathBuf,
    #[arg(
        long,
        default_value = ".py",
        help = "Comma-separated file extensions (e.g. .py,.txt)"
    )]
    extensions: String,
    #[arg(short = 's', long, help = "Do not print the per-file statistics tree")]
    no_stats: bool,
    #[arg(short = 'M', long, default_value = "gpt-4o", help = "Tokenizer model for statistics")]
    model: String,
}

async fn run(args: CliArgs) -> Result<(), CollectError> {
    let extensions = parse_extensions(&args.extensions);
    let filter = FileFilter::from_ignore_file(extensions, &args.ignore_file)?;

    let document = dispatch(
        &args.source,
        args.ssh_path.as_deref(),
        args.password,
        &filter,
    )
    .await?;
    debug!("Collected {} entries", document.len());

    let result = document.render();
    println!("{}", result);
    println!("Total characters: {}", result.chars().count());

    if !args.no_stats {
        if let Err(e) = print_stats(&document, &args.model) {
            warn!("Could not compute statistics: {}", e);
        }
    }

    if !args.no_clipboard {
        match copy_to_clipboard(&result) {
            Ok(()) => println!("Successfully copied to clipboard!"),
            Err(e) => {
                warn!("{}", e);
                println!("Failed to copy to clipboard!");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli_args = CliArgs::parse();
    initialize_logger();

    if let Err(e) = run(cli_args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
