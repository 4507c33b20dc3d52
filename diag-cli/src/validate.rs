use anyhow::{Context, Result, bail};
use diag_plan::Severity;
use std::path::Path;

pub fn run_validate(input: &Path, quiet: bool, summary: bool) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;

    let mut all_errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if let Err(schema_errors) = diag_plan::validate_plan_schema(&text) {
        for e in &schema_errors {
            all_errors.push(format!("schema: {e}"));
        }
    }

    match diag_plan::parse_plan(&text) {
        Ok(plan) => {
            for issue in diag_plan::validate_semantics(&plan) {
                match issue.severity {
                    Severity::Error => all_errors.push(issue.to_string()),
                    Severity::Warning => warnings.push(issue.to_string()),
                }
            }
        }
        Err(e) => all_errors.push(format!("parse: {e}")),
    }

    if !quiet && !summary {
        for w in &warnings {
            eprintln!("{}: {w}", input.display());
        }
    }

    if all_errors.is_empty() {
        if !quiet {
            println!("{}: valid", input.display());
        }
        return Ok(());
    }

    if !quiet && !summary {
        for e in &all_errors {
            eprintln!("{}: {e}", input.display());
        }
    }

    if summary || !quiet {
        println!(
            "{}: {} validation error{}",
            input.display(),
            all_errors.len(),
            if all_errors.len() == 1 { "" } else { "s" }
        );
    }

    bail!(
        "{} validation error{} in {}",
        all_errors.len(),
        if all_errors.len() == 1 { "" } else { "s" },
        input.display()
    );
}
