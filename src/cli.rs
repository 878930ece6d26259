//! CLI: manifest → (generated sources | check report)
use std::path::PathBuf;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::config::{GeneratedMarker, ImportPolicy, LifecycleTable, RecipeConfig};
use crate::di::{EnumIdGenerator, RecipeGenerator};
use crate::error::ProcessingError;
use crate::manifest::ManifestHost;
use crate::pipeline::{DirectoryFiler, Filer, Generator, MemoryFiler, Processor, RoundReport};
use crate::render::Renderer;
use crate::types::ClassType;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate bean recipes and enum qualifier annotations from declaration manifests
#[derive(Parser, Debug)]
#[command(name = "tendril")]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// run the generators and write the sources
    Generate(GenerateOut),
    /// run the generators and report what would be written
    Check(CheckOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more manifests. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct GeneratorSettings {
    /// leave the registry marker off generated recipes
    #[arg(long)]
    no_registry: bool,

    /// fixed RFC 3339 stamp for the generated marker (now if omitted)
    #[arg(long)]
    timestamp: Option<DateTime<Utc>>,

    /// extra lifecycle mapping, `a.b.Marker=a.b.RecipeBase`
    #[arg(long = "lifecycle", value_name = "MARKER=BASE")]
    lifecycles: Vec<String>,

    /// extra qualifier annotation whose `value` names a bean
    #[arg(long = "qualifier", value_name = "FQN")]
    qualifiers: Vec<String>,

    /// package whose types are never imported (java.lang always is)
    #[arg(long = "implicit-package", value_name = "PACKAGE")]
    implicit_packages: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    generator_settings: GeneratorSettings,

    /// source root for the generated files (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    generator_settings: GeneratorSettings,
}

/// Everything one run needs, resolved from the flags.
struct Toolchain {
    recipe: RecipeConfig,
    marker: GeneratedMarker,
    renderer: Renderer,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl GeneratorSettings {
    fn toolchain(&self) -> anyhow::Result<Toolchain> {
        // one stamp for the whole run
        let marker = GeneratedMarker::default().at(self.timestamp.unwrap_or_else(Utc::now));

        let mut lifecycles = LifecycleTable::default();
        for mapping in &self.lifecycles {
            let Some((lifecycle, base)) = mapping.split_once('=') else {
                bail!("invalid lifecycle mapping `{mapping}`, expected MARKER=BASE");
            };
            lifecycles = lifecycles.register(ClassType::from_fqn(lifecycle.trim()), ClassType::from_fqn(base.trim()));
        }
        let mut recipe = RecipeConfig {
            lifecycles,
            annotate_registry: !self.no_registry,
            marker: marker.clone(),
            ..RecipeConfig::default()
        };
        recipe.qualifiers.extend(self.qualifiers.iter().map(|q| ClassType::from_fqn(q)));

        let policy = self
            .implicit_packages
            .iter()
            .fold(ImportPolicy::default(), |policy, package| policy.with_implicit(package.clone()));

        Ok(Toolchain { recipe, marker, renderer: Renderer::new(policy) })
    }
}

impl Toolchain {
    /// Both generators over one manifest, recipes first.
    fn process<F: Filer>(&self, host: &ManifestHost, filer: &mut F) -> anyhow::Result<RoundReport> {
        let mut report = round(RecipeGenerator::new(self.recipe.clone()), &self.renderer, host, filer)?;
        let enum_ids = round(EnumIdGenerator::new(self.marker.clone()), &self.renderer, host, filer)?;
        report.written.extend(enum_ids.written);
        report.warnings.extend(enum_ids.warnings);
        report.idle &= enum_ids.idle;
        Ok(report)
    }
}

fn round<G: Generator, F: Filer>(
    generator: G,
    renderer: &Renderer,
    host: &ManifestHost,
    filer: &mut F,
) -> Result<RoundReport, ProcessingError> {
    Processor::with_renderer(generator, renderer.clone()).process(host, host, host, filer)
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                let toolchain = target.generator_settings.toolchain()?;
                for host in target.input_settings.load()? {
                    let label = source_label(&host);
                    match target.out.as_ref() {
                        Some(out) => {
                            let mut filer = DirectoryFiler::new(out);
                            let report = toolchain
                                .process(&host, &mut filer)
                                .with_context(|| format!("failed to process {label}"))?;
                            summarize(&label, &report, "wrote");
                        }
                        None => {
                            let mut filer = MemoryFiler::new();
                            let report = toolchain
                                .process(&host, &mut filer)
                                .with_context(|| format!("failed to process {label}"))?;
                            for name in filer.names() {
                                println!("// {name}");
                                println!("{}", filer.file(&name).unwrap_or_default());
                            }
                            summarize(&label, &report, "generated");
                        }
                    }
                }
            }
            Command::Check(target) => {
                let toolchain = target.generator_settings.toolchain()?;
                for host in target.input_settings.load()? {
                    let label = source_label(&host);
                    let report = toolchain
                        .process(&host, &mut MemoryFiler::new())
                        .with_context(|| format!("failed to process {label}"))?;
                    summarize(&label, &report, "would write");
                }
            }
        }
        Ok(())
    }
}

impl InputSettings {
    fn load(&self) -> anyhow::Result<Vec<ManifestHost>> {
        resolve_file_path_patterns(&self.input)?
            .into_iter()
            .map(|path| {
                ManifestHost::from_path(&path).with_context(|| format!("failed to load manifest {}", path.display()))
            })
            .collect()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn source_label(host: &ManifestHost) -> String {
    host.source()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<manifest>".to_string())
}

fn summarize(label: &str, report: &RoundReport, verb: &str) {
    if report.idle {
        eprintln!("{} {label}: nothing to do", "·".dimmed());
        return;
    }
    for warning in &report.warnings {
        eprintln!("{} {warning}", "warning:".yellow().bold());
    }
    for name in &report.written {
        eprintln!("{} {verb} {name}", "✓".green());
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(args: &[&str]) -> GeneratorSettings {
        let mut argv = vec!["tendril", "check", "--input", "m.json"];
        argv.extend_from_slice(args);
        match CommandLineInterface::try_parse_from(argv).unwrap().cmd {
            Command::Check(check) => check.generator_settings,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn lifecycle_flags_extend_the_default_table() {
        let toolchain = settings(&["--lifecycle", "app.Pooled=app.PooledRecipe"]).toolchain().unwrap();
        let markers: Vec<String> = toolchain.recipe.lifecycles.iter().map(|(m, _)| m.fully_qualified_name()).collect();
        assert_eq!(markers, ["tendril.bean.Singleton", "tendril.bean.Factory", "app.Pooled"]);
    }

    #[test]
    fn malformed_lifecycle_mapping_is_an_error() {
        assert!(settings(&["--lifecycle", "app.Pooled"]).toolchain().is_err());
    }

    #[test]
    fn timestamp_is_shared_by_both_generators() {
        let toolchain = settings(&["--timestamp", "2024-03-09T14:05:00Z", "--no-registry"]).toolchain().unwrap();
        assert_eq!(toolchain.marker.stamp(), "2024-03-09T14:05:00.000Z");
        assert_eq!(toolchain.recipe.marker, toolchain.marker);
        assert!(!toolchain.recipe.annotate_registry);
    }

    #[test]
    fn glob_without_matches_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.json", dir.path().display());
        assert!(resolve_file_path_patterns([pattern]).is_err());
    }
}
