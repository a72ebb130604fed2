use clap::{CommandFactory, Parser, Subcommand};
use easybake::config::{self, SiteConfig};
use easybake::{output, serve, site};
use env_logger::Env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "easybake")]
#[command(about = "Generate a static website")]
#[command(long_about = "\
Generate a static website

A site manifest (JSON or YAML) lists page declarations in build order. Each
page renders a template with variables taken from earlier named pages, an
optional datafile and inline data. A page with a `name` feeds its output to
every page below it; a page with a `url` is written into the output tree.

  site.json
  {
    \"content\": [
      {\"template\": \"post.html\", \"datafile\": \"hello.yaml\",
       \"name\": \"posts\", \"url\": \"/posts/hello.html\"},
      {\"template\": \"index.html\", \"url\": \"/\", \"assets\": [\"site.css\"]}
    ]
  }

Project layout (defaults):

  templates/     # Handlebars templates, referenced by relative path
  content/       # Datafiles; markdown fragments become HTML
  assets/        # Files listed in a page's `assets`
  build/         # Output, wiped on every build
  easybake.toml  # Optional config

Run 'easybake gen-config' to generate a documented easybake.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Template directory
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    /// Content (datafile) directory
    #[arg(long, global = true)]
    content: Option<PathBuf>,

    /// Asset source directory
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// Output directory
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Port for the preview server
    #[arg(long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site described by a manifest
    Build {
        /// Site manifest (.json, .yaml or .yml)
        #[arg(long)]
        site: PathBuf,
    },
    /// Serve the output directory over HTTP until interrupted
    Serve,
    /// Remove the output directory
    Clean,
    /// Print a stock easybake.toml with all options documented
    GenConfig,
    #[command(external_subcommand)]
    Other(Vec<String>),
}

fn main() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let cli = parse_cli(std::env::args_os().collect());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Parse arguments, accepting command names in any letter case.
///
/// An unrecognized command whose lowercase form is a known command is parsed
/// again with the lowercase name, so `easybake Build` runs `build`.
fn parse_cli(mut argv: Vec<OsString>) -> Cli {
    let cli = Cli::parse_from(argv.clone());
    if let Command::Other(args) = &cli.command {
        let name = args.first().map(String::as_str).unwrap_or_default();
        let lower = name.to_lowercase();
        if lower != name && Cli::command().find_subcommand(&lower).is_some() {
            // The external subcommand swallows everything after its name
            let pos = argv.len() - args.len();
            argv[pos] = OsString::from(lower);
            return Cli::parse_from(argv);
        }
    }
    cli
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }
    if let Command::Other(args) = &cli.command {
        let name = args.first().map(String::as_str).unwrap_or_default();
        return Err(format!("Unknown command '{name}'").into());
    }

    let config = resolve_config(&cli)?;

    match cli.command {
        Command::Build { site } => {
            let builder = site::SiteBuilder::new(config);
            let report = builder.build(&site)?;
            output::print_build_output(&report);
        }
        Command::Serve => {
            let preview = serve::Preview::bind(&config.output_root, &config.serve)?;
            println!("serving at http://{}/", preview.addr());
            preview.run()?;
            println!("Stopping...");
        }
        Command::Clean => {
            site::clean(&config.output_root)?;
        }
        Command::GenConfig | Command::Other(_) => {}
    }

    Ok(())
}

/// Load the config file, then apply command-line overrides on top.
fn resolve_config(cli: &Cli) -> Result<SiteConfig, config::ConfigError> {
    let mut config = config::load_config(&cli.config)?;
    if let Some(dir) = &cli.templates {
        config.template_root = dir.clone();
    }
    if let Some(dir) = &cli.content {
        config.content_root = dir.clone();
    }
    if let Some(dir) = &cli.assets {
        config.asset_root = dir.clone();
    }
    if let Some(dir) = &cli.output {
        config.output_root = dir.clone();
    }
    if let Some(port) = cli.port {
        config.serve.port = port;
    }
    config.validate()?;
    Ok(config)
}
