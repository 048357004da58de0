//! Headless CLI
//!
//! Command-line interface for splitting header-only C++ sources.

mod harness;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use headless_core::{Config, SplitConfig};
use headless_parser::preprocessor::scan;
use headless_parser::treesitter::CppFrontEnd;
use headless_parser::{outline, SplitNames, Splitter};
use headless_sync::{sync, SyncRequest};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "headless")]
#[command(author, version, about = "Split .hpp files into .hpp header and .cpp source files", long_about = None)]
struct Cli {
    /// YAML configuration file; flags given on the command line win
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by the commands that split
#[derive(clap::Args, Debug, Clone, Copy)]
struct SplitFlags {
    /// Add #line markers pointing at the original header
    #[arg(short = 'l', long = "lines")]
    lines: bool,

    /// Wrap interfaces in #ifndef HEADER_XXX / #define HEADER_XXX / #endif
    #[arg(short = 'w', long = "wrap")]
    wrap: bool,

    /// Salt include guard names with a hash of the output path
    #[arg(long)]
    salt: bool,
}

impl SplitFlags {
    fn apply(&self, config: &mut SplitConfig) {
        config.emit_line_directives |= self.lines;
        config.wrap_in_include_guard |= self.wrap;
        config.salt_include_guard |= self.salt;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a single header
    Split {
        /// Header to split
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write <name>.hpp and <name>.cpp here instead of printing them
        #[arg(short, long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        #[command(flatten)]
        flags: SplitFlags,

        /// Output format when printing
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Synchronise an output tree with a source tree
    Sync {
        /// Source directory
        #[arg(long, value_name = "DIR")]
        from: PathBuf,

        /// Output directory
        #[arg(long, value_name = "DIR")]
        to: PathBuf,

        /// Only process files changed since the last run (keeps .snapshot.txt)
        #[arg(short = 'i', long)]
        incremental: bool,

        /// Write sources.txt listing the generated .cpp files
        #[arg(short = 'g', long = "sources-list")]
        sources_list: bool,

        #[command(flatten)]
        flags: SplitFlags,

        /// Report format
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Run the splitter against a directory of fixtures
    Test {
        /// Directory with one sub-directory per case
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Print a declaration-only outline of a header
    Outline {
        /// Header to outline
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_yaml_file(path)
            .with_context(|| format!("Cannot load configuration {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Split {
            file,
            out_dir,
            flags,
            format,
        } => {
            let mut split = config.split;
            flags.apply(&mut split);
            cmd_split(&file, out_dir.as_deref(), split, format)?;
        }
        Commands::Sync {
            from,
            to,
            incremental,
            sources_list,
            flags,
            format,
        } => {
            let mut request = SyncRequest {
                from,
                to,
                split: config.split,
                sync: config.sync,
            };
            flags.apply(&mut request.split);
            request.sync.incremental |= incremental;
            request.sync.generate_sources_list |= sources_list;
            return cmd_sync(&request, format);
        }
        Commands::Test { dir } => return cmd_test(&dir),
        Commands::Outline { file } => cmd_outline(&file)?,
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_split(file: &Path, out_dir: Option<&Path>, config: SplitConfig, format: Format) -> Result<()> {
    let mut splitter = Splitter::new(config);
    let names = SplitNames::for_path(file);
    let output = splitter.split_file(file, &names)?;

    let Some(out_dir) = out_dir else {
        match format {
            Format::Json => println!("{}", serde_json::to_string_pretty(&output)?),
            Format::Text => {
                println!("// ---- {} ----", names.interface_name);
                print!("{}", output.interface);
                if !output.implementation.is_empty() {
                    println!("\n// ---- implementation ----");
                    print!("{}", output.implementation);
                }
            }
        }
        return Ok(());
    };

    std::fs::create_dir_all(out_dir)?;
    let interface = out_dir.join(&names.interface_name);
    std::fs::write(&interface, &output.interface)?;
    println!("📄 {}", interface.display());
    if !output.implementation.is_empty() {
        let implementation = interface.with_extension("cpp");
        std::fs::write(&implementation, &output.implementation)?;
        println!("📄 {}", implementation.display());
    }
    println!("   {} definitions hoisted, {} edits", output.hoisted, output.edits);
    Ok(())
}

fn cmd_sync(request: &SyncRequest, format: Format) -> Result<ExitCode> {
    if request.from == request.to {
        bail!("--from and --to must differ");
    }
    let report = sync(request)?;
    match format {
        Format::Json => println!("{}", report.to_json()?),
        Format::Text => {
            println!("🔄 {} -> {}", request.from.display(), request.to.display());
            println!("   {}", report.summary());
            for failure in &report.failed {
                println!("   ❌ {}: {}", failure.path, failure.error);
            }
        }
    }
    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn cmd_test(dir: &Path) -> Result<ExitCode> {
    let results = harness::run(dir)?;
    for result in &results {
        println!("{}", result.line());
    }
    Ok(if results.iter().all(|r| r.passed) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn cmd_outline(file: &Path) -> Result<()> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("Cannot read {}", file.display()))?;
    let scanned = scan(&source);
    let Some(tree) = CppFrontEnd::new().parse(&source, &scanned) else {
        bail!("No syntax tree for {}", file.display());
    };
    print!("{}", outline::outline(&tree, &source));
    Ok(())
}
