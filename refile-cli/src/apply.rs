use anyhow::{bail, Result};
use refile_core::{
    ApplyResult, Config, OutcomeStatus, OutputFormat, OutputFormatter, PreviewResult,
    RenameExecutor,
};
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::cli::RuleArgs;
use crate::rules::build_rule_set;

pub fn handle_apply(
    directory: &Path,
    rule_args: &RuleArgs,
    format: OutputFormat,
    use_color: bool,
    auto_approve: bool,
    config: &Config,
) -> Result<i32> {
    let (rules, _) = build_rule_set(rule_args, config)?;
    if rules.is_empty() {
        bail!("no rename rules given; use --map, --delete, --prefix, --suffix, or --rules");
    }

    let mut executor = RenameExecutor::new(directory)?;

    if !auto_approve {
        let preview = executor.preview(&rules)?;
        let pending = preview.renamed + preview.count(OutcomeStatus::Failed);
        if pending == 0 && preview.count(OutcomeStatus::SkippedCollision) == 0 {
            println!("Nothing to rename in '{}'.", directory.display());
            return Ok(0);
        }

        let shown = PreviewResult {
            directory: directory.display().to_string(),
            report: preview.clone(),
            use_color,
        };
        println!("{}", shown.format(format));

        print!(
            "Rename {} of {} files in '{}'? [y/N] ",
            preview.renamed,
            preview.total(),
            directory.display()
        );
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println!("Aborted.");
            return Ok(0);
        }
    }

    let report = executor.execute(&rules)?;
    let failed = report.count(OutcomeStatus::Failed);

    let result = ApplyResult {
        directory: directory.display().to_string(),
        report,
        use_color,
    };
    println!("{}", result.format(format));

    Ok(if failed > 0 { 1 } else { 0 })
}
