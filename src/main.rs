use clap::{Parser, Subcommand};
use inkpost::{build, config, output};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "inkpost")]
#[command(about = "Static blog generator")]
#[command(long_about = "\
Static blog generator

Markdown posts with a keyword header become HTML pages, a home page, and one
page per tag.

Project structure:

  ./
  ├── site.toml                    # Optional config (see 'inkpost gen-config')
  ├── posts/
  │   ├── hello-world.md           # One post per file
  │   └── images/cover.jpg         # Media, linked into build/medias/
  ├── styles/main.scss             # Compiled with its imports
  ├── templates/
  │   ├── layout.html
  │   └── parts/{header,index,tag}.html
  └── static/                      # Copied verbatim into build/

Post header:

  #+TITLE: Hello, World
  #+DATE: 2024-03-09
  #+SLUG: hello-world
  #+TAGS: rust, web
  #+HERO: images/cover.jpg

Running 'inkpost' with no command builds the site.")]
#[command(version)]
struct Cli {
    /// Project root containing site.toml, posts/, styles/, templates/
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Only print the final summary and errors
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Build the full site (default)
    Build,
    /// Parse documents and compile styles without writing anything
    Check,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = if cli.quiet {
        output::Reporter::quiet()
    } else {
        output::Reporter::new()
    };

    match cli.command.unwrap_or(Command::Build) {
        Command::Build => {
            let site_config = config::load_config(&cli.root)?;
            let paths = site_config.resolve(&cli.root);
            let summary = build::build_site(&paths, &site_config, &mut reporter)?;
            println!();
            println!("{}", output::format_summary(&summary));
        }
        Command::Check => {
            let site_config = config::load_config(&cli.root)?;
            let paths = site_config.resolve(&cli.root);
            let summary = build::check_site(&paths, &site_config, &mut reporter)?;
            println!("{}", output::format_check_summary(&summary));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
