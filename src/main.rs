use clap::{Parser, Subcommand};
use sitegen::{config, output, site};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "sitegen")]
#[command(about = "Static site generator for multi-language project websites")]
#[command(long_about = "\
Static site generator for multi-language project websites

Pages are declared in structure.json, not discovered: every entry has a path,
a generator deciding what is rendered there, and an optional menu placement.
Languages other than the default one patch entries through
structure.<code>.json and are published below /<code>/.

Content structure:

  content/
  ├── generator.toml               # Generator settings (optional, see gen-config)
  ├── config.json                  # {\"languages\": [[\"\", \"English\"], [\"de\", \"Deutsch\"]]}
  ├── structure.json               # Ordered list of entries
  ├── structure.de.json            # Per-language overrides, keyed by path
  ├── static/                      # Copied to output/static, holds favicon.ico
  ├── downloads/                   # Copied to output/downloads
  ├── home.md                      # Sources referenced by meta.input
  └── man/                         # Manpages referenced by meta.directory

Generators:
  markdown   meta.input rendered with highlighting and heading anchors
  html       meta.input inserted verbatim
  downloads  file table of meta.directory, newest first, with signatures
  manpages   every manpage in meta.directory converted (man2html -r)
  directory  meta.directory mounted as-is
  alias      symlink to the page at meta.target
  link       external menu link to meta.url
  (none)     menu separator

Run 'sitegen gen-config' to generate a documented generator.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory (overrides output_dir from generator.toml)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Log progress (same as RUST_LOG=info)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site into the output directory, replacing its contents
    Build,
    /// Validate content and show each language's menu without writing anything
    Check,
    /// Print a stock generator.toml with all options documented
    GenConfig,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build => {
            let config = config::load_config(&cli.source)?;
            let output_dir = cli
                .output
                .unwrap_or_else(|| PathBuf::from(&config.output_dir));
            println!(
                "==> Building {} \u{2192} {}",
                cli.source.display(),
                output_dir.display()
            );
            let report = site::build_site(&cli.source, &output_dir, &config)?;
            output::print_build_output(&report, &config);
        }
        Command::Check => {
            let config = config::load_config(&cli.source)?;
            println!("==> Checking {}", cli.source.display());
            let report = site::check_site(&cli.source, &config)?;
            output::print_check_output(&report);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
