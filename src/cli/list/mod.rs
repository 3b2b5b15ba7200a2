//! List command - shows the cases a selection collects without running them

use anyhow::Context;
use clap::Args;

use super::{init_logging, load_config, SelectionArgs, Status};
use crate::domain::classifier::Approach;
use crate::domain::test_case::SelectedCase;

/// Arguments for the list command
#[derive(Args, Clone, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Also show expectations for each case
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// List the selected test cases
pub async fn run(args: ListArgs) -> anyhow::Result<Status> {
    let config = load_config().context("Failed to load configuration")?;
    init_logging(&config);

    let selection = args.selection.selection()?;
    let registry = args
        .selection
        .registry()
        .context("Failed to collect test cases")?;
    let selected = registry.select(&selection);

    for case in &selected {
        println!("{}", format_case(case, args.verbose));
    }

    let assertions: usize = selected.iter().map(|s| s.assertion_count()).sum();
    println!(
        "\n{} of {} cases selected ({} assertions)",
        selected.len(),
        registry.len(),
        assertions
    );

    Ok(if selected.is_empty() {
        Status::NoTestsCollected
    } else {
        Status::Passed
    })
}

fn format_case(case: &SelectedCase<'_>, verbose: u8) -> String {
    let approaches: Vec<&str> = Approach::ALL
        .iter()
        .filter(|a| case.is_selected(**a))
        .map(|a| a.as_str())
        .collect();

    let mut line = format!(
        "{:>3} {} [{}]",
        case.index,
        case.test_case.id(),
        approaches.join(", ")
    );

    let markers = case.test_case.markers();
    if !markers.is_empty() {
        let markers: Vec<&str> = markers.iter().map(String::as_str).collect();
        line.push_str(&format!(" @{}", markers.join(" @")));
    }

    if verbose > 0 {
        let test_case = case.test_case;
        line.push_str(&format!(
            "\n      expected: {}, filter: {}, min confidence: {:.2}",
            test_case.expected_category().unwrap_or("None"),
            test_case.should_apply_filter(),
            test_case.min_confidence()
        ));
        if !test_case.alternative_categories().is_empty() {
            line.push_str(&format!(
                ", alternatives: {}",
                test_case.alternative_categories().join(", ")
            ));
        }
    }

    line
}
