use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use readgo::commands::validators;
use readgo::types::FileType;
use readgo::validator::ValidationLevel;
use readgo::{commands::*, config::Config, config::ConfigValidator};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "readgo")]
#[command(about = "Read, analyze and validate Go source code")]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to readgo.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory all paths are resolved against
    #[arg(short = 'w', long, global = true)]
    work_dir: Option<String>,

    /// Validation level: basic, standard or strict
    #[arg(short, long, global = true)]
    level: Option<ValidationLevel>,

    /// Output in JSON format for machine consumption
    #[arg(long, global = true)]
    json: bool,

    /// Disable concurrent analysis
    #[arg(long, global = true)]
    sequential: bool,

    /// Upper bound on concurrently analyzed files or packages
    #[arg(long, global = true)]
    max_concurrency: Option<usize>,

    /// Per-operation timeout in seconds (0 disables it)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Leave `_test.go` files out of package loading
    #[arg(long, global = true)]
    no_tests: bool,

    /// Exclude files and directories matching these patterns (can be specified multiple times)
    #[arg(short = 'e', long, global = true)]
    exclude: Vec<String>,

    /// Only include files matching these patterns (can be specified multiple times)
    #[arg(short = 'i', long, global = true)]
    include: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a file, package or the whole project
    Analyze {
        #[command(subcommand)]
        target: AnalyzeArgs,
    },

    /// Find a type, interface or function in a package or its imports
    Find {
        #[command(subcommand)]
        kind: FindArgs,
    },

    /// Validate a file, package, dependencies or the whole project
    Validate {
        #[command(subcommand)]
        target: ValidateArgs,
    },

    /// Report import cycles reachable from a package
    Cycles {
        /// Package path or pattern
        #[arg(default_value = ".")]
        package: String,
    },

    /// Print the file tree under a directory
    Tree {
        #[arg(default_value = ".")]
        root: String,

        /// Which files to list
        #[arg(short = 't', long, value_enum, default_value_t = FileTypeArg::All)]
        file_type: FileTypeArg,
    },

    /// Search files by name
    Search {
        /// Substring of the file name
        pattern: String,

        #[arg(short = 't', long, value_enum, default_value_t = FileTypeArg::All)]
        file_type: FileTypeArg,
    },

    /// Print a source file
    Read {
        path: String,

        /// Remove comments
        #[arg(long)]
        strip_comments: bool,

        /// Trim leading and trailing whitespace on every line
        #[arg(long)]
        strip_spaces: bool,

        /// List function and method line spans instead of the source
        #[arg(long)]
        functions: bool,
    },
}

#[derive(Subcommand)]
enum AnalyzeArgs {
    /// Analyze a single file
    File { path: String },
    /// Analyze a package and the exported scope of its imports
    Package { path: String },
    /// Analyze every Go file of a module
    Project {
        #[arg(default_value = ".")]
        path: String,
    },
}

#[derive(Subcommand)]
enum FindArgs {
    /// Find a named type
    Type { package: String, name: String },
    /// Find a named interface type
    Interface { package: String, name: String },
    /// Find a function
    Function { package: String, name: String },
}

#[derive(Subcommand)]
enum ValidateArgs {
    /// Validate a single file
    File { path: String },
    /// Validate a package
    Package { path: String },
    /// Validate every package of the module
    Project,
    /// Check that a package's imports resolve
    Deps { package: String },
    /// Check the module's external requirements
    External,
}

#[derive(Clone, Copy, ValueEnum)]
enum FileTypeArg {
    All,
    Go,
    Test,
    Generated,
}

impl From<FileTypeArg> for FileType {
    fn from(arg: FileTypeArg) -> Self {
        match arg {
            FileTypeArg::All => FileType::All,
            FileTypeArg::Go => FileType::Go,
            FileTypeArg::Test => FileType::Test,
            FileTypeArg::Generated => FileType::Generated,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = build_context(&cli)?;
    execute_builtin_command(cli.command, &context).await
}

/// Merge the configuration file with the command line; flags win
fn build_context(cli: &Cli) -> Result<CommandContext> {
    if let Some(work_dir) = &cli.work_dir {
        validators::validate_path_argument("--work-dir", work_dir)?;
    }
    validators::validate_patterns("--exclude", &cli.exclude)?;
    validators::validate_patterns("--include", &cli.include)?;
    validators::validate_concurrency(cli.max_concurrency)?;

    let config = Config::load_or_default(cli.config.as_deref())?;
    let mut builder = config.to_builder();

    if let Some(work_dir) = &cli.work_dir {
        builder = builder.with_work_dir(work_dir);
    }
    if let Some(level) = cli.level {
        builder = builder.with_validation_level(level);
    }
    if cli.sequential {
        builder = builder.with_concurrent_analysis(false);
    }
    if let Some(max) = cli.max_concurrency {
        builder = builder.with_max_concurrent_analysis(max);
    }
    if let Some(timeout) = cli.timeout {
        builder = builder.with_analysis_timeout(Duration::from_secs(timeout));
    }
    if cli.no_tests {
        builder = builder.with_include_tests(false);
    }
    if !cli.exclude.is_empty() {
        builder = builder.with_exclude_patterns(cli.exclude.clone());
    }
    if !cli.include.is_empty() {
        builder = builder.with_include_patterns(cli.include.clone());
    }

    let options = builder.build();
    ConfigValidator::validate_options(&options)?;
    Ok(CommandContext::new(options, cli.json))
}

async fn execute_builtin_command(command: Commands, context: &CommandContext) -> Result<()> {
    match command {
        Commands::Analyze { target } => {
            let target = match target {
                AnalyzeArgs::File { path } => {
                    validators::validate_path_argument("file path", &path)?;
                    AnalyzeTarget::File(path)
                }
                AnalyzeArgs::Package { path } => {
                    validators::validate_path_argument("package path", &path)?;
                    AnalyzeTarget::Package(path)
                }
                AnalyzeArgs::Project { path } => AnalyzeTarget::Project(path),
            };
            AnalyzeCommand { target }.execute(context).await?;
        }
        Commands::Find { kind } => {
            let (kind, package, name) = match kind {
                FindArgs::Type { package, name } => (FindKind::Type, package, name),
                FindArgs::Interface { package, name } => (FindKind::Interface, package, name),
                FindArgs::Function { package, name } => (FindKind::Function, package, name),
            };
            validators::validate_path_argument("package path", &package)?;
            validators::validate_identifier("name", &name)?;
            FindCommand {
                kind,
                package,
                name,
            }
            .execute(context)
            .await?;
        }
        Commands::Validate { target } => {
            let target = match target {
                ValidateArgs::File { path } => {
                    validators::validate_path_argument("file path", &path)?;
                    ValidateTarget::File(path)
                }
                ValidateArgs::Package { path } => {
                    validators::validate_path_argument("package path", &path)?;
                    ValidateTarget::Package(path)
                }
                ValidateArgs::Project => ValidateTarget::Project,
                ValidateArgs::Deps { package } => {
                    validators::validate_path_argument("package path", &package)?;
                    ValidateTarget::Dependencies(package)
                }
                ValidateArgs::External => ValidateTarget::External,
            };
            ValidateCommand { target }.execute(context).await?;
        }
        Commands::Cycles { package } => {
            validators::validate_path_argument("package path", &package)?;
            ValidateCommand {
                target: ValidateTarget::Cycles(package),
            }
            .execute(context)
            .await?;
        }
        Commands::Tree { root, file_type } => {
            TreeCommand {
                root,
                file_type: file_type.into(),
            }
            .execute(context)
            .await?;
        }
        Commands::Search { pattern, file_type } => {
            validators::validate_path_argument("search pattern", &pattern)?;
            SearchCommand {
                pattern,
                file_type: file_type.into(),
            }
            .execute(context)
            .await?;
        }
        Commands::Read {
            path,
            strip_comments,
            strip_spaces,
            functions,
        } => {
            validators::validate_path_argument("file path", &path)?;
            ReadCommand {
                path,
                strip_comments,
                strip_spaces,
                functions,
            }
            .execute(context)
            .await?;
        }
    }

    Ok(())
}
