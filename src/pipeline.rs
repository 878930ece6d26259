//! Discovery & dispatch.
//!
//! A [`Processor`] consumes one batch of discovered elements, loads each into
//! the declaration model, validates it, hands it to a [`Generator`] and writes
//! whatever comes back. Any error aborts the round.
pub mod filer;
pub mod host;

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, info, warn};

pub use filer::{DirectoryFiler, Filer, MemoryFiler, SourceFile};
pub use host::{Assignability, Element, ElementKind, Loader, RoundEnvironment};

use crate::error::ProcessingError;
use crate::model::{ClassDecl, Method};
use crate::render::Renderer;
use crate::types::ClassType;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Output of one generation call.
#[derive(Debug, Clone)]
pub struct Generated {
    pub declaration: ClassDecl,
    /// Types referenced only from code lines.
    pub imports: BTreeSet<ClassType>,
    /// Design warnings; reported, never fatal.
    pub warnings: Vec<String>,
}

impl Generated {
    pub fn new(declaration: ClassDecl) -> Self {
        Self { declaration, imports: BTreeSet::new(), warnings: Vec::new() }
    }

    pub fn ty(&self) -> &ClassType {
        self.declaration.ty()
    }
}

/// Domain logic plugged into the pipeline, one per handled annotation.
pub trait Generator {
    /// The annotation whose elements this generator consumes.
    fn annotation(&self) -> &ClassType;

    fn validate_type(&self, _decl: &ClassDecl, _types: &dyn Assignability) -> Result<(), ProcessingError> {
        Ok(())
    }

    /// `Ok(None)` means nothing to emit.
    fn process_type(&self, decl: &ClassDecl) -> Result<Option<Generated>, ProcessingError>;

    /// `false` rejects method-level elements before they are loaded.
    fn applies_to_methods(&self) -> bool {
        true
    }

    fn process_method(&self, owner: &ClassType, method: &Method) -> Result<Option<Generated>, ProcessingError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    Scanning,
    PerElement,
    Validating,
    Generating,
    Writing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Idle => "idle",
            Stage::Scanning => "scanning",
            Stage::PerElement => "per-element",
            Stage::Validating => "validating",
            Stage::Generating => "generating",
            Stage::Writing => "writing",
        };
        f.write_str(label)
    }
}

/// What a finished round produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundReport {
    /// Fully-qualified names of the written source files.
    pub written: Vec<String>,
    pub warnings: Vec<String>,
    /// The round was skipped: error already raised, processing over, or no elements.
    pub idle: bool,
}

impl RoundReport {
    /// Each annotation is handled in exactly one round.
    pub fn claims_more_rounds(&self) -> bool {
        false
    }
}

pub struct Processor<G> {
    generator: G,
    renderer: Renderer,
    stage: Stage,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl<G: Generator> Processor<G> {
    pub fn new(generator: G) -> Self {
        Self::with_renderer(generator, Renderer::default())
    }

    pub fn with_renderer(generator: G, renderer: Renderer) -> Self {
        Self { generator, renderer, stage: Stage::Idle }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage, subject: &str) {
        debug!(from = %self.stage, to = %stage, subject, "stage transition");
        self.stage = stage;
    }

    /// Run one round. The processor is back in [`Stage::Idle`] afterwards,
    /// whether the round succeeded or not.
    pub fn process<R, L, F>(
        &mut self,
        round: &R,
        loader: &L,
        types: &dyn Assignability,
        filer: &mut F,
    ) -> Result<RoundReport, ProcessingError>
    where
        R: RoundEnvironment,
        L: Loader<R::Element>,
        F: Filer,
    {
        let result = self.run(round, loader, types, filer);
        self.enter(Stage::Idle, "round");
        result
    }

    fn run<R, L, F>(
        &mut self,
        round: &R,
        loader: &L,
        types: &dyn Assignability,
        filer: &mut F,
    ) -> Result<RoundReport, ProcessingError>
    where
        R: RoundEnvironment,
        L: Loader<R::Element>,
        F: Filer,
    {
        let mut report = RoundReport::default();
        if round.error_raised() || round.processing_over() {
            debug!("nothing to do");
            report.idle = true;
            return Ok(report);
        }
        let annotation = self.generator.annotation().clone();
        let elements = round.elements_annotated_with(&annotation);
        if elements.is_empty() {
            debug!(annotation = %annotation, "nothing to do");
            report.idle = true;
            return Ok(report);
        }

        self.enter(Stage::Scanning, &annotation.fully_qualified_name());
        for element in &elements {
            let name = element.qualified_name();
            let generated = match element.kind() {
                ElementKind::Type => self.type_element(element, &name, loader, types)?,
                ElementKind::Method => self.method_element(element, &name, loader)?,
                ElementKind::Other => {
                    debug!(element = %name, "skipping element that is neither a type nor a method");
                    continue;
                }
            };
            let Some(generated) = generated else {
                continue;
            };
            for w in &generated.warnings {
                warn!(element = %name, "{w}");
            }
            report.warnings.extend(generated.warnings.iter().cloned());
            report.written.push(self.write(filer, &generated)?);
        }
        Ok(report)
    }

    fn type_element<E, L: Loader<E>>(
        &mut self,
        element: &E,
        name: &str,
        loader: &L,
        types: &dyn Assignability,
    ) -> Result<Option<Generated>, ProcessingError> {
        self.enter(Stage::PerElement, name);
        let decl = loader
            .load_type(element)
            .map_err(|e| ProcessingError::Load { name: name.to_string(), reason: e.0 })?;

        self.enter(Stage::Validating, name);
        self.generator.validate_type(&decl, types)?;

        self.enter(Stage::Generating, name);
        self.generator.process_type(&decl)
    }

    fn method_element<E: Element, L: Loader<E>>(
        &mut self,
        element: &E,
        name: &str,
        loader: &L,
    ) -> Result<Option<Generated>, ProcessingError> {
        self.enter(Stage::PerElement, name);
        if !self.generator.applies_to_methods() {
            return Err(ProcessingError::not_applicable(
                name,
                format!("{} cannot be applied to any method", self.generator.annotation()),
            ));
        }
        let (owner, method) = loader
            .load_method(element)
            .map_err(|e| ProcessingError::Load { name: name.to_string(), reason: e.0 })?;

        self.enter(Stage::Validating, name);
        let declared = element.parameter_type_count();
        let modeled = method.parameters().len();
        if declared != modeled {
            return Err(ProcessingError::CardinalityMismatch { name: name.to_string(), declared, modeled });
        }

        self.enter(Stage::Generating, name);
        self.generator.process_method(&owner, &method)
    }

    /// Open, write once, close; the file is closed even when the write fails.
    fn write<F: Filer>(&mut self, filer: &mut F, generated: &Generated) -> Result<String, ProcessingError> {
        let fqn = generated.ty().fully_qualified_name();
        self.enter(Stage::Writing, &fqn);
        let text = self.renderer.render(&generated.declaration, &generated.imports);

        let io_error = |source: std::io::Error| ProcessingError::Write { name: fqn.clone(), source };
        let mut file = filer.create_source_file(&fqn).map_err(io_error)?;
        let written = file.write(&text);
        let closed = file.close();
        written.and(closed).map_err(io_error)?;

        info!(file = %fqn, "generated source written");
        Ok(fqn)
    }
}
