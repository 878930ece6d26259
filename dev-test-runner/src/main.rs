//! Golden-file runner.
//!
//! Every `fixtures/<case>/manifest.json` is run through both generators with a
//! fixed timestamp. Each generated file is compared with
//! `fixtures/<case>/expected/<fqn>.java`; an optional `case.json` may instead
//! expect the round to fail with a message matching `error`.
//!
//! `cargo run -p dev-test-runner -- --bless` rewrites the expected files.
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use chrono::{TimeZone, Utc};
use colored::Colorize;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use tendril::config::{GeneratedMarker, RecipeConfig};
use tendril::di::{EnumIdGenerator, RecipeGenerator};
use tendril::manifest::ManifestHost;
use tendril::pipeline::{Generator, MemoryFiler, Processor};

static TRAILING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CaseSettings {
    #[serde(default)]
    no_registry: bool,
    /// Regex the processing error must match.
    #[serde(default)]
    error: Option<String>,
}

enum Outcome {
    Pass,
    Blessed(usize),
    Fail(String),
}

fn main() -> ExitCode {
    tendril::init_tracing();
    let bless = std::env::args().any(|a| a == "--bless");
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");

    let cases = match list_cases(&root) {
        Ok(cases) => cases,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };

    let mut failed = 0;
    for case in &cases {
        let name = case.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        match run_case(case, bless) {
            Ok(Outcome::Pass) => eprintln!("{} {name}", "✓".green()),
            Ok(Outcome::Blessed(n)) => eprintln!("{} {name} ({n} files blessed)", "★".cyan()),
            Ok(Outcome::Fail(why)) => {
                failed += 1;
                eprintln!("{} {name}\n{why}", "✗".red());
            }
            Err(error) => {
                failed += 1;
                eprintln!("{} {name}: {error:#}", "✗".red());
            }
        }
    }
    eprintln!("{} cases, {failed} failed", cases.len());
    if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn list_cases(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut cases = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("failed to read {}", root.display()))? {
        let path = entry?.path();
        if path.join("manifest.json").is_file() {
            cases.push(path);
        }
    }
    cases.sort();
    Ok(cases)
}

fn run_case(case: &Path, bless: bool) -> anyhow::Result<Outcome> {
    let settings: CaseSettings = match fs::read_to_string(case.join("case.json")) {
        Ok(src) => {
            let de = &mut serde_json::Deserializer::from_str(&src);
            serde_path_to_error::deserialize(de).map_err(|err| {
                let path = err.path().to_string();
                anyhow::anyhow!("case.json at JSON path {path} → {}", err.into_inner())
            })?
        }
        Err(_) => CaseSettings::default(),
    };

    let host = ManifestHost::from_path(case.join("manifest.json"))?;
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().context("fixed timestamp")?;
    let marker = GeneratedMarker::default().at(at);
    let recipe = RecipeConfig { annotate_registry: !settings.no_registry, marker: marker.clone(), ..RecipeConfig::default() };

    let mut filer = MemoryFiler::new();
    let result = round(RecipeGenerator::new(recipe), &host, &mut filer)
        .and_then(|_| round(EnumIdGenerator::new(marker), &host, &mut filer));

    match (result, settings.error) {
        (Err(error), Some(pattern)) => {
            let re = Regex::new(&pattern).with_context(|| format!("invalid error pattern {pattern}"))?;
            if re.is_match(&error.to_string()) {
                Ok(Outcome::Pass)
            } else {
                Ok(Outcome::Fail(format!("  error `{error}` does not match `{pattern}`")))
            }
        }
        (Err(error), None) => Ok(Outcome::Fail(format!("  unexpected error: {error}"))),
        (Ok(()), Some(pattern)) => Ok(Outcome::Fail(format!("  expected an error matching `{pattern}`"))),
        (Ok(()), None) => compare(case, &filer, bless),
    }
}

fn round<G: Generator>(
    generator: G,
    host: &ManifestHost,
    filer: &mut MemoryFiler,
) -> Result<(), tendril::ProcessingError> {
    Processor::new(generator).process(host, host, host, filer).map(|_| ())
}

fn compare(case: &Path, filer: &MemoryFiler, bless: bool) -> anyhow::Result<Outcome> {
    let expected_dir = case.join("expected");
    if bless {
        if expected_dir.exists() {
            fs::remove_dir_all(&expected_dir)?;
        }
        fs::create_dir_all(&expected_dir)?;
        let names = filer.names();
        for name in &names {
            fs::write(expected_dir.join(format!("{name}.java")), filer.file(name).unwrap_or_default())?;
        }
        return Ok(Outcome::Blessed(names.len()));
    }

    let mut problems = Vec::new();
    let mut expected_names = Vec::new();
    if expected_dir.is_dir() {
        for entry in fs::read_dir(&expected_dir)? {
            let path = entry?.path();
            if let Some(stem) = path.file_stem() {
                expected_names.push(stem.to_string_lossy().to_string());
            }
        }
    }
    expected_names.sort();
    let mut actual_names = filer.names();
    actual_names.sort();
    if expected_names != actual_names {
        problems.push(format!("  files: expected {expected_names:?}, generated {actual_names:?}"));
    }

    for name in &actual_names {
        let path = expected_dir.join(format!("{name}.java"));
        let Ok(expected) = fs::read_to_string(&path) else {
            continue;
        };
        let actual = filer.file(name).unwrap_or_default();
        if normalize(&expected) != normalize(&actual) {
            problems.push(format!("  {name} differs:\n{}", first_difference(&expected, &actual)));
        }
    }

    if problems.is_empty() { Ok(Outcome::Pass) } else { Ok(Outcome::Fail(problems.join("\n"))) }
}

fn normalize(text: &str) -> String {
    TRAILING_WS.replace_all(&text.replace("\r\n", "\n"), "").trim_end().to_string()
}

fn first_difference(expected: &str, actual: &str) -> String {
    let expected = normalize(expected);
    let actual = normalize(actual);
    let mut e = expected.lines();
    let mut a = actual.lines();
    let mut line = 1;
    loop {
        match (e.next(), a.next()) {
            (Some(x), Some(y)) if x == y => line += 1,
            (x, y) => {
                return format!(
                    "    line {line}\n    - {}\n    + {}",
                    x.unwrap_or("<eof>"),
                    y.unwrap_or("<eof>")
                );
            }
        }
    }
}
