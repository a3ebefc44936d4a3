//! Readers for the two sides of a reconciliation: Gherkin feature files and
//! Java step-definition sources

use super::{ImplementedStep, ScenarioStep, StepKeyword, classify_keyword, unescape_expression};
use crate::error::{ForgeError, Result};
use gherkin::{Feature, GherkinEnv, Step};
use regex_utils::cucumber;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Declared steps of a feature, background and rule steps included.
///
/// Scenario outline steps are kept verbatim, `<placeholder>` and all.
pub fn parse_feature(content: &str) -> std::result::Result<Vec<ScenarioStep>, String> {
    let mut source = content.to_string();
    if !source.ends_with('\n') {
        source.push('\n');
    }

    let feature = Feature::parse(&source, GherkinEnv::default()).map_err(|e| format!("{:?}", e))?;

    let mut steps: Vec<&Step> = Vec::new();
    if let Some(background) = &feature.background {
        steps.extend(&background.steps);
    }
    for scenario in &feature.scenarios {
        steps.extend(&scenario.steps);
    }
    for rule in &feature.rules {
        if let Some(background) = &rule.background {
            steps.extend(&background.steps);
        }
        for scenario in &rule.scenarios {
            steps.extend(&scenario.steps);
        }
    }

    Ok(steps.into_iter().map(|step| ScenarioStep::new(&step.value)).collect())
}

/// Load scenario steps from a `.feature` file or every feature file under a directory
pub async fn load_scenario_steps(path: &Path) -> Result<Vec<ScenarioStep>> {
    let files = feature_files(path)?;
    if files.is_empty() {
        warn!("No feature files found under {}", path.display());
    }

    let mut steps = Vec::new();
    for file in files {
        let content = tokio::fs::read_to_string(&file)
            .await
            .map_err(|source| ForgeError::FileAccess { path: file.clone(), source })?;
        let parsed = parse_feature(&content)
            .map_err(|message| ForgeError::FeatureParse { path: file.clone(), message })?;
        debug!("{}: {} steps", file.display(), parsed.len());
        steps.extend(parsed);
    }
    Ok(steps)
}

fn feature_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|e| ForgeError::FileAccess {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| path.to_path_buf()),
            source: e.into(),
        })?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "feature") {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Steps bound by `@Given`/`@When`/`@Then`/`@And`/`@But` annotations in a Java source.
///
/// Commented-out annotations are ignored. `@And`/`@But` bindings take the
/// keyword their phrasing suggests.
pub fn parse_implemented_steps(content: &str) -> Vec<ImplementedStep> {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .flat_map(|line| cucumber::STEP_ANNOTATION.captures_iter(line))
        .map(|caps| {
            let text = unescape_expression(&caps["expr"]);
            let keyword = match &caps["keyword"] {
                "Given" => StepKeyword::Given,
                "When" => StepKeyword::When,
                "Then" => StepKeyword::Then,
                _ => classify_keyword(&text),
            };
            ImplementedStep::new(&text, keyword)
        })
        .collect()
}
