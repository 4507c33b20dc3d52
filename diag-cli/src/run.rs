use anyhow::{Context, Result, bail};
use diag_plan::{PlanCase, PlanDocument, Severity};
use diag_report::{
    Status, SuiteReport, SuiteStats, TestReport, case_key, write_json_file, write_suite_json_file,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Load, validate and parse a plan file. Schema and semantic errors abort;
/// semantic warnings are logged.
pub fn load_plan(input: &Path) -> Result<PlanDocument> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;

    if let Err(errors) = diag_plan::validate_plan_schema(&text) {
        for e in &errors {
            log::error!("{}: schema: {e}", input.display());
        }
        bail!("{} schema error(s) in {}", errors.len(), input.display());
    }

    let plan = diag_plan::parse_plan(&text)
        .with_context(|| format!("parsing plan from {}", input.display()))?;

    let issues = diag_plan::validate_semantics(&plan);
    let mut errors = 0;
    for issue in &issues {
        match issue.severity {
            Severity::Error => {
                log::error!("{}: {issue}", input.display());
                errors += 1;
            }
            Severity::Warning => log::warn!("{}: {issue}", input.display()),
        }
    }
    if errors > 0 {
        bail!("{errors} semantic error(s) in {}", input.display());
    }

    Ok(plan)
}

/// Run one case into a fresh report. A case that cannot be completed is
/// marked `ERROR` with a step naming the cause.
fn run_one(plan: &PlanDocument, case: &PlanCase) -> TestReport {
    let mut report = TestReport::new(&case.name);
    report.goal.clone_from(&case.goal);
    report.requirements.clone_from(&case.requirements);
    report.project.clone_from(&plan.project);
    report.dut.clone_from(&plan.dut);

    if let Err(e) = diag_plan::run_case(case, plan, &mut report) {
        log::error!("case '{}' aborted: {e}", case.name);
        report.add_step(Status::Error, &format!("case aborted: {e}"));
    }
    report
}

/// Run all cases of one plan, writing `<output_dir>/<plan-stem>/<case>.json`
/// and `<output_dir>/<plan-stem>/suite.json`.
pub fn run_plan(input: &Path, output_dir: &Path) -> Result<SuiteReport> {
    let plan = load_plan(input)?;
    let plan_dir = output_dir.join(plan_dir_name(input));

    let mut suite = SuiteReport::new(&plan.name);
    suite.project.clone_from(&plan.project);

    for case in &plan.cases {
        let report = run_one(&plan, case);
        let path = plan_dir.join(format!("{}.json", case_key(&case.name)));
        write_json_file(&report, &path).with_context(|| format!("writing {}", path.display()))?;
        suite.push(report);
    }

    let suite_path = plan_dir.join("suite.json");
    write_suite_json_file(&suite, &suite_path)
        .with_context(|| format!("writing {}", suite_path.display()))?;
    Ok(suite)
}

fn plan_dir_name(input: &Path) -> String {
    input.file_stem().unwrap_or_default().to_string_lossy().into_owned()
}

/// Plans write into a directory named after their file stem, so two plans
/// sharing a stem would overwrite each other's reports.
fn check_unique_stems(plans: &[PathBuf]) -> Result<()> {
    let mut seen: BTreeMap<String, &Path> = BTreeMap::new();
    for input in plans {
        let name = plan_dir_name(input);
        if let Some(first) = seen.get(&name) {
            bail!(
                "{} and {} would both write reports to '{name}', rename one of them",
                first.display(),
                input.display()
            );
        }
        seen.insert(name, input);
    }
    Ok(())
}

pub fn run_plans(plans: &[PathBuf], output_dir: &Path) -> Result<()> {
    use rayon::prelude::*;

    check_unique_stems(plans)?;

    if !output_dir.exists() {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("creating output directory {}", output_dir.display()))?;
    }

    let results: Vec<(PathBuf, Result<SuiteReport>)> = plans
        .par_iter()
        .map(|input| (input.clone(), run_plan(input, output_dir)))
        .collect();

    let mut failed = 0;
    let mut statuses = Vec::new();
    for (input, result) in &results {
        match result {
            Ok(suite) => {
                for case in suite.cases() {
                    println!("{:<5} {}: {}", case.status().as_str(), suite.name, case.name);
                    statuses.push(case.status());
                }
            }
            Err(e) => {
                eprintln!("FAILED {}: {e:#}", input.display());
                failed += 1;
            }
        }
    }

    let stats = SuiteStats::from_statuses(statuses);
    println!("{stats}");

    if failed > 0 {
        bail!("{failed} of {} plans could not be run", plans.len());
    }
    if stats.overall.is_failure() {
        bail!("suite finished with {}", stats.overall);
    }

    println!("Reports written to {}", output_dir.display());
    Ok(())
}
