use anyhow::Context;
use clap::Parser;
use refile_core::{Config, OutputFormat};
use std::io::{self, IsTerminal};
use std::process;
use std::str::FromStr;

mod apply;
mod cli;
mod preview;
mod rules;

use cli::{Cli, Commands, OutputFormatArg};

fn main() {
    let cli = Cli::parse();

    // Handle -C directory flag
    if let Some(ref dir) = cli.directory {
        if let Err(e) = std::env::set_current_dir(dir)
            .with_context(|| format!("failed to change to directory '{}'", dir.display()))
        {
            eprintln!("Error: {e:#}");
            process::exit(2);
        }
    }

    let config = Config::load().unwrap_or_default();
    // NO_COLOR is presence-based: any value, not just "true", disables color
    let no_color = cli.no_color || std::env::var_os("NO_COLOR").is_some();
    let use_color = match config.defaults.use_color {
        _ if no_color => false,
        Some(choice) => choice,
        None => io::stdout().is_terminal(),
    };
    let auto_approve = cli.yes || std::env::var_os("REFILE_YES").is_some();

    let result = match cli.command {
        Commands::Preview {
            directory,
            rule_args,
            output,
        } => preview::handle_preview(
            &directory,
            &rule_args,
            resolve_format(output, &config),
            use_color,
            &config,
        ),
        Commands::Apply {
            directory,
            rule_args,
            output,
        } => apply::handle_apply(
            &directory,
            &rule_args,
            resolve_format(output, &config),
            use_color,
            auto_approve,
            &config,
        ),
        Commands::Save {
            file,
            rule_args,
            name,
            description,
            work_path,
        } => rules::handle_save(&file, &rule_args, name, description, work_path, &config),
        Commands::Show { file } => rules::handle_show(&file),
        Commands::Export { file, out } => rules::handle_export(&file, out.as_deref()),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(2);
        },
    }
}

/// CLI flag wins, then the configured default, then summary.
fn resolve_format(arg: Option<OutputFormatArg>, config: &Config) -> OutputFormat {
    arg.map_or_else(
        || {
            OutputFormat::from_str(&config.defaults.output_format)
                .unwrap_or(OutputFormat::Summary)
        },
        Into::into,
    )
}
