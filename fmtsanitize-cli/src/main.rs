use std::path::{Path, PathBuf};
use std::process;

use clap::{Args as ClapArgs, Parser, Subcommand};
use fmtsanitize_cli::{
    ConfigOverrides, FileStatus, find_values_resources, resolve_config, sanitize_file,
    sanitize_files, sanitize::print_scan_results,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

/// Options shared by every command that builds a rewriter.
#[derive(ClapArgs, Debug, Clone)]
struct ConfigArgs {
    /// TOML config file (defaults to ./fmtsanitize.toml when present)
    #[arg(short, long)]
    config: Option<String>,

    /// `name` attribute of the string resource to rewrite
    #[arg(short, long)]
    name: Option<String>,

    /// Placeholder keyword to recognize (repeatable)
    #[arg(short, long = "keyword")]
    keywords: Vec<String>,
}

impl ConfigArgs {
    fn overrides(&self, resource_dir: Option<String>) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            target_name: self.name.clone(),
            keywords: self.keywords.clone(),
            resource_dir,
        }
    }
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize placeholders in a piece of text and print the result.
    Normalize {
        /// The text to normalize
        #[arg(short, long)]
        text: String,

        /// Placeholder keyword to recognize (repeatable)
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,
    },

    /// Rewrite the target string in one resource file.
    Rewrite {
        /// The resource file to process
        #[arg(short, long)]
        input: String,

        /// Where to write the result (defaults to rewriting the input in place)
        #[arg(short, long)]
        output: Option<String>,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Find values resources under a directory and rewrite them in place.
    Scan {
        /// Directory to search (repeatable)
        #[arg(short, long = "root", required = true)]
        roots: Vec<String>,

        /// Only consider files whose name matches this glob (repeatable)
        #[arg(long)]
        include: Vec<String>,

        /// Name of the directory holding `values*/` folders
        #[arg(long)]
        resource_dir: Option<String>,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run_normalize_command(text: &str, keywords: Vec<String>) -> Result<(), String> {
    let config = resolve_config(&ConfigOverrides {
        keywords,
        ..ConfigOverrides::default()
    })?;
    let normalized = config.normalizer().normalize(text);
    println!("{}", normalized.text);
    Ok(())
}

fn run_rewrite_command(
    input: &str,
    output: Option<&str>,
    dry_run: bool,
    config: &ConfigArgs,
) -> Result<(), String> {
    let config = resolve_config(&config.overrides(None))?;
    let rewriter = config.rewriter();
    let status = sanitize_file(Path::new(input), output.map(Path::new), &rewriter, dry_run)?;
    let target = output.unwrap_or(input);
    match status {
        FileStatus::Rewritten { replacements } => {
            let verb = if dry_run { "Would rewrite" } else { "Rewrote" };
            println!(
                "✅ {} {} placeholder(s) in <{}> -> {}",
                verb,
                replacements,
                rewriter.target_name(),
                target
            );
        }
        FileStatus::Unchanged => println!("No placeholders to rewrite in {}", input),
        FileStatus::Skipped { reason } => {
            println!("⚠️  {} is not valid XML, left unchanged: {}", input, reason)
        }
        FileStatus::Failed { error } => return Err(error),
    }
    Ok(())
}

fn run_scan_command(
    roots: &[String],
    include: &[String],
    resource_dir: Option<String>,
    dry_run: bool,
    json: bool,
    config: &ConfigArgs,
) -> Result<(), String> {
    let config = resolve_config(&config.overrides(resource_dir))?;
    let roots: Vec<PathBuf> = roots.iter().map(PathBuf::from).collect();
    let paths = find_values_resources(&roots, &config.resource_dir, include)?;
    log::debug!("found {} candidate file(s)", paths.len());

    let results = sanitize_files(&paths, &config.rewriter(), dry_run);
    print_scan_results(&results, dry_run, json);

    let failed = results
        .iter()
        .filter(|r| matches!(r.status, FileStatus::Failed { .. }))
        .count();
    if failed > 0 {
        return Err(format!("{} file(s) failed", failed));
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.commands {
        Commands::Normalize { text, keywords } => run_normalize_command(&text, keywords),
        Commands::Rewrite {
            input,
            output,
            dry_run,
            config,
        } => run_rewrite_command(&input, output.as_deref(), dry_run, &config),
        Commands::Scan {
            roots,
            include,
            resource_dir,
            dry_run,
            json,
            config,
        } => run_scan_command(&roots, &include, resource_dir, dry_run, json, &config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
