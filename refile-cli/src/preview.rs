use anyhow::{bail, Result};
use refile_core::{Config, OutputFormat, OutputFormatter, PreviewResult, RenameExecutor};
use std::path::Path;

use crate::cli::RuleArgs;
use crate::rules::build_rule_set;

pub fn handle_preview(
    directory: &Path,
    rule_args: &RuleArgs,
    format: OutputFormat,
    use_color: bool,
    config: &Config,
) -> Result<i32> {
    let (rules, _) = build_rule_set(rule_args, config)?;
    if rules.is_empty() {
        bail!("no rename rules given; use --map, --delete, --prefix, --suffix, or --rules");
    }

    let executor = RenameExecutor::new(directory)?;
    let report = executor.preview(&rules)?;

    let result = PreviewResult {
        directory: directory.display().to_string(),
        report,
        use_color,
    };
    println!("{}", result.format(format));
    Ok(0)
}
