//! iterm-profiles: CLI for installing and converting iTerm2 color-scheme profiles
//!
//! This tool is not affiliated with or endorsed by iTerm2 or its authors.
//! It edits locally stored preference files on your machine for personal use.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;

use iterm_profiles::commands::{self, convert::ConvertMode, utils::WriteOptions};
use iterm_profiles::config::Paths;

#[derive(Parser)]
#[command(name = "iterm-profiles")]
#[command(about = "CLI helper for iTerm2 color-scheme profiles", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by commands that write the preference store
#[derive(Args)]
struct StoreArgs {
    /// Preference file (default: ~/Library/Preferences/com.googlecode.iterm2.plist)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Show what would be done without making changes
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Keep a timestamped copy of the preference file before writing
    #[arg(long)]
    backup: bool,
}

impl StoreArgs {
    fn write_options(&self) -> WriteOptions {
        WriteOptions {
            dry_run: self.dry_run,
            backup: self.backup,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Add profiles that use already-imported color presets by name
    Add {
        /// Profile names or `Name=Scheme File` pairs (default: curated list)
        schemes: Vec<String>,

        /// Profile to copy settings from
        #[arg(long, short, default_value = "Default")]
        template: String,

        /// Font for new profiles, e.g. "Menlo-Regular 14"
        #[arg(long)]
        font: Option<String>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Import .itermcolors files as profiles with full colors
    Import {
        /// Profile names or `Name=Scheme File` pairs (default: curated list)
        schemes: Vec<String>,

        /// Directory of .itermcolors files
        /// (default: ~/Downloads/iTerm2-Color-Schemes-master/schemes)
        #[arg(long)]
        schemes_dir: Option<PathBuf>,

        /// Profile to copy settings from
        #[arg(long, short, default_value = "Default")]
        template: String,

        /// Font for new profiles
        #[arg(long)]
        font: Option<String>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Convert dynamic profiles into regular, editable profiles
    Convert {
        /// Dynamic profiles file (default: DynamicProfiles/ColorProfiles.json)
        #[arg(long, short)]
        input: Option<PathBuf>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Like convert, but rewrite every color and drop preset names
    Restore {
        /// Dynamic profiles file (default: DynamicProfiles/ColorProfiles.json)
        #[arg(long, short)]
        input: Option<PathBuf>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Write dynamic profiles with colors embedded from installed presets
    Embed {
        /// Profile names or `Name=Scheme File` pairs (default: curated list)
        schemes: Vec<String>,

        /// Directory of .itermcolors files
        /// (default: ~/Library/Application Support/iTerm2/ColorPresets)
        #[arg(long)]
        schemes_dir: Option<PathBuf>,

        /// Output file (default: DynamicProfiles/ColorProfiles.json)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Profile the dynamic profiles inherit from
        #[arg(long, default_value = "Default")]
        parent: String,

        /// Font for new profiles
        #[arg(long)]
        font: Option<String>,

        /// Show what would be done without making changes
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Write tagged dynamic profiles for schemes suited to coding
    Standalone {
        /// Scheme names (default: recommended list)
        schemes: Vec<String>,

        /// Directory of .itermcolors files
        /// (default: ~/Downloads/iTerm2-Color-Schemes-master/schemes)
        #[arg(long)]
        schemes_dir: Option<PathBuf>,

        /// Output file (default: DynamicProfiles/CodeDevProfiles.json)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Profile the dynamic profiles inherit from
        #[arg(long, default_value = "Default")]
        parent: String,

        /// Font for new profiles
        #[arg(long)]
        font: Option<String>,

        /// Show what would be done without making changes
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Write dynamic profiles that switch in per repository directory
    Rebuild {
        /// `repo=Scheme` bindings (default: built-in table)
        bindings: Vec<String>,

        /// Directory containing the repositories (default: ~/work/repo)
        #[arg(long)]
        repo_dir: Option<PathBuf>,

        /// Directory of .itermcolors files
        /// (default: ~/Downloads/iTerm2-Color-Schemes-master/schemes)
        #[arg(long)]
        schemes_dir: Option<PathBuf>,

        /// Output file (default: DynamicProfiles/RepoProfiles.json)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Profile the dynamic profiles inherit from
        #[arg(long, default_value = "Default")]
        parent: String,

        /// Font for new profiles
        #[arg(long)]
        font: Option<String>,

        /// Show what would be done without making changes
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// List profiles in the preference store
    List {
        /// List a dynamic profiles file instead
        #[arg(long)]
        dynamic: Option<PathBuf>,

        /// Show the Guid of each profile
        #[arg(long)]
        with_id: bool,

        /// Only show profiles whose name contains this pattern
        #[arg(long, short)]
        filter: Option<String>,

        /// Profile marked as the template
        #[arg(long, short, default_value = "Default")]
        template: String,

        /// Preference file (default: ~/Library/Preferences/com.googlecode.iterm2.plist)
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

fn print_dry_run_banner(dry_run: bool) {
    if dry_run {
        println!("{}", "(DRY-RUN MODE - no changes will be made)".blue());
    }
}

fn main() -> Result<()> {
    // Diagnostics go to stderr; RUST_LOG=debug for more
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Add {
            schemes,
            template,
            font,
            store,
        } => {
            print_dry_run_banner(store.dry_run);
            let paths = Paths {
                store_path: store.store.clone(),
                ..Default::default()
            };
            let options = commands::add::AddOptions {
                schemes,
                template,
                font,
                write: store.write_options(),
            };
            commands::add::execute(&paths, options)?;
        }

        Commands::Import {
            schemes,
            schemes_dir,
            template,
            font,
            store,
        } => {
            print_dry_run_banner(store.dry_run);
            let paths = Paths {
                store_path: store.store.clone(),
                scheme_dir: schemes_dir,
                output_path: None,
            };
            let options = commands::import::ImportOptions {
                schemes,
                template,
                font,
                write: store.write_options(),
            };
            commands::import::execute(&paths, options)?;
        }

        Commands::Convert { input, store } => {
            print_dry_run_banner(store.dry_run);
            let paths = Paths {
                store_path: store.store.clone(),
                ..Default::default()
            };
            let options = commands::convert::ConvertOptions {
                input,
                mode: ConvertMode::Convert,
                write: store.write_options(),
            };
            commands::convert::execute(&paths, options)?;
        }

        Commands::Restore { input, store } => {
            print_dry_run_banner(store.dry_run);
            let paths = Paths {
                store_path: store.store.clone(),
                ..Default::default()
            };
            let options = commands::convert::ConvertOptions {
                input,
                mode: ConvertMode::Restore,
                write: store.write_options(),
            };
            commands::convert::execute(&paths, options)?;
        }

        Commands::Embed {
            schemes,
            schemes_dir,
            output,
            parent,
            font,
            dry_run,
        } => {
            print_dry_run_banner(dry_run);
            let paths = Paths {
                store_path: None,
                scheme_dir: schemes_dir,
                output_path: output,
            };
            let options = commands::embed::EmbedOptions {
                schemes,
                parent,
                font,
                dry_run,
            };
            commands::embed::execute(&paths, options)?;
        }

        Commands::Standalone {
            schemes,
            schemes_dir,
            output,
            parent,
            font,
            dry_run,
        } => {
            print_dry_run_banner(dry_run);
            let paths = Paths {
                store_path: None,
                scheme_dir: schemes_dir,
                output_path: output,
            };
            let options = commands::standalone::StandaloneOptions {
                schemes,
                parent,
                font,
                dry_run,
            };
            commands::standalone::execute(&paths, options)?;
        }

        Commands::Rebuild {
            bindings,
            repo_dir,
            schemes_dir,
            output,
            parent,
            font,
            dry_run,
        } => {
            print_dry_run_banner(dry_run);
            let paths = Paths {
                store_path: None,
                scheme_dir: schemes_dir,
                output_path: output,
            };
            let options = commands::rebuild::RebuildOptions {
                bindings,
                repo_dir,
                parent,
                font,
                dry_run,
            };
            commands::rebuild::execute(&paths, options)?;
        }

        Commands::List {
            dynamic,
            with_id,
            filter,
            template,
            store,
        } => {
            let paths = Paths {
                store_path: store,
                ..Default::default()
            };
            let options = commands::list::ListOptions {
                dynamic,
                with_id,
                filter,
                template,
            };
            let output = commands::list::execute(&paths, options)?;
            println!("{}", output);
        }
    }

    Ok(())
}
