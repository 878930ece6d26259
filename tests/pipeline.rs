use std::cell::Cell;

use pretty_assertions::assert_eq;

use tendril::builder::{ClassBuilder, MethodBuilder};
use tendril::di::{EnumIdGenerator, RecipeGenerator};
use tendril::error::LoadError;
use tendril::manifest::ManifestHost;
use tendril::model::{ClassDecl, Method};
use tendril::pipeline::{
    Assignability, DirectoryFiler, Element, ElementKind, Generated, Generator, Loader, MemoryFiler, Processor,
    RoundEnvironment, Stage,
};
use tendril::types::{ClassType, Primitive};
use tendril::ProcessingError;

// ————————————————————————————————————————————————————————————————————————————
// FAKE HOST
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
struct FakeElement {
    kind: ElementKind,
    name: &'static str,
    declared_parameters: usize,
}

impl Element for FakeElement {
    fn kind(&self) -> ElementKind {
        self.kind
    }

    fn qualified_name(&self) -> String {
        self.name.to_string()
    }

    fn parameter_type_count(&self) -> usize {
        self.declared_parameters
    }
}

#[derive(Default)]
struct FakeRound {
    error_raised: bool,
    processing_over: bool,
    elements: Vec<FakeElement>,
}

impl RoundEnvironment for FakeRound {
    type Element = FakeElement;

    fn error_raised(&self) -> bool {
        self.error_raised
    }

    fn processing_over(&self) -> bool {
        self.processing_over
    }

    fn elements_annotated_with(&self, _annotation: &ClassType) -> Vec<FakeElement> {
        self.elements.clone()
    }
}

/// Loads every type as an empty class and every method with `modeled_parameters` int parameters.
#[derive(Default)]
struct FakeLoader {
    modeled_parameters: usize,
    loads: Cell<usize>,
}

impl Loader<FakeElement> for FakeLoader {
    fn load_type(&self, element: &FakeElement) -> Result<ClassDecl, LoadError> {
        self.loads.set(self.loads.get() + 1);
        Ok(ClassBuilder::for_concrete_class(ClassType::from_fqn(element.name)).without_marker().build()?)
    }

    fn load_method(&self, element: &FakeElement) -> Result<(ClassType, Method), LoadError> {
        self.loads.set(self.loads.get() + 1);
        let (owner, name) = element.name.split_once("::").unwrap_or(("app.Owner", element.name));
        let mut builder = MethodBuilder::new(Primitive::Int, name).empty_implementation();
        for i in 0..self.modeled_parameters {
            builder = builder.add_parameter(
                tendril::builder::ParameterBuilder::new(Primitive::Int, format!("p{i}")).build()?,
            )?;
        }
        Ok((ClassType::from_fqn(owner), builder.build()?))
    }
}

struct Exact;

impl Assignability for Exact {
    fn is_assignable(&self, candidate: &ClassType, target: &ClassType) -> bool {
        candidate == target
    }
}

/// Echoes every type as `<Name>Echo`; methods produce nothing.
struct Echo {
    annotation: ClassType,
}

impl Echo {
    fn new() -> Self {
        Self { annotation: ClassType::new("test", "Marker") }
    }
}

impl Generator for Echo {
    fn annotation(&self) -> &ClassType {
        &self.annotation
    }

    fn process_type(&self, decl: &ClassDecl) -> Result<Option<Generated>, ProcessingError> {
        let echo = ClassBuilder::for_concrete_class(decl.ty().with_suffix("Echo"))
            .build()
            .map_err(|source| ProcessingError::IllegalBuilderUse { name: decl.ty().to_string(), source })?;
        Ok(Some(Generated::new(echo)))
    }

    fn process_method(&self, _owner: &ClassType, _method: &Method) -> Result<Option<Generated>, ProcessingError> {
        Ok(None)
    }
}

fn ty(name: &'static str) -> FakeElement {
    FakeElement { kind: ElementKind::Type, name, declared_parameters: 0 }
}

fn method(name: &'static str, declared_parameters: usize) -> FakeElement {
    FakeElement { kind: ElementKind::Method, name, declared_parameters }
}

// ————————————————————————————————————————————————————————————————————————————
// ROUND SEMANTICS
// ————————————————————————————————————————————————————————————————————————————

#[test]
fn nothing_to_do_rounds_stay_idle() {
    let rounds = [
        FakeRound { error_raised: true, elements: vec![ty("app.A")], ..FakeRound::default() },
        FakeRound { processing_over: true, elements: vec![ty("app.A")], ..FakeRound::default() },
        FakeRound::default(),
    ];
    for round in &rounds {
        let loader = FakeLoader::default();
        let mut filer = MemoryFiler::new();
        let report = Processor::new(Echo::new()).process(round, &loader, &Exact, &mut filer).unwrap();
        assert!(report.idle);
        assert!(!report.claims_more_rounds());
        assert_eq!(loader.loads.get(), 0);
        assert_eq!(filer.opened(), 0);
    }
}

#[test]
fn other_elements_are_skipped() {
    let round = FakeRound {
        elements: vec![FakeElement { kind: ElementKind::Other, name: "app.pkg", declared_parameters: 0 }, ty("app.A")],
        ..FakeRound::default()
    };
    let loader = FakeLoader::default();
    let mut filer = MemoryFiler::new();
    let report = Processor::new(Echo::new()).process(&round, &loader, &Exact, &mut filer).unwrap();
    assert_eq!(report.written, ["app.AEcho"]);
    assert_eq!(loader.loads.get(), 1);
    assert!(!report.idle);
}

#[test]
fn parameter_cardinality_must_agree_both_ways() {
    for (declared, modeled) in [(2, 1), (0, 1)] {
        let round = FakeRound { elements: vec![method("app.A::run", declared)], ..FakeRound::default() };
        let loader = FakeLoader { modeled_parameters: modeled, ..FakeLoader::default() };
        let mut processor = Processor::new(Echo::new());
        let err = processor.process(&round, &loader, &Exact, &mut MemoryFiler::new()).unwrap_err();
        match err {
            ProcessingError::CardinalityMismatch { name, declared: d, modeled: m } => {
                assert_eq!((name.as_str(), d, m), ("app.A::run", declared, modeled));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(processor.stage(), Stage::Idle);
    }
}

#[test]
fn method_generating_nothing_writes_nothing() {
    let round = FakeRound { elements: vec![method("app.A::run", 1)], ..FakeRound::default() };
    let loader = FakeLoader { modeled_parameters: 1, ..FakeLoader::default() };
    let mut filer = MemoryFiler::new();
    let report = Processor::new(Echo::new()).process(&round, &loader, &Exact, &mut filer).unwrap();
    assert!(report.written.is_empty());
    assert_eq!(filer.opened(), 0);
}

#[test]
fn failed_write_still_closes_the_file() {
    let round = FakeRound { elements: vec![ty("app.A"), ty("app.B")], ..FakeRound::default() };
    let mut filer = MemoryFiler::failing_writes();
    let err = Processor::new(Echo::new())
        .process(&round, &FakeLoader::default(), &Exact, &mut filer)
        .unwrap_err();
    assert!(matches!(err, ProcessingError::Write { .. }));
    assert_eq!(err.subject(), "app.AEcho");
    // the round stops at the first failure
    assert_eq!((filer.opened(), filer.closed()), (1, 1));
    assert!(filer.names().is_empty());
}

#[test]
fn enum_ids_are_never_generated_for_methods() {
    let round = FakeRound { elements: vec![method("app.A::pick", 3)], ..FakeRound::default() };
    let loader = FakeLoader::default();
    let err = Processor::new(EnumIdGenerator::default())
        .process(&round, &loader, &Exact, &mut MemoryFiler::new())
        .unwrap_err();
    assert!(matches!(err, ProcessingError::NotApplicable { .. }));
    assert_eq!(err.subject(), "app.A::pick");
    assert_eq!(loader.loads.get(), 0);
}

// ————————————————————————————————————————————————————————————————————————————
// WITH THE MANIFEST HOST
// ————————————————————————————————————————————————————————————————————————————

const BEANS: &str = r#"{
    "declarations": [
        {
            "name": "app.Holder",
            "visibility": "public",
            "annotations": [{ "type": "tendril.bean.Bean" }, { "type": "tendril.bean.Singleton" }],
            "fields": [{ "name": "widget", "type": "app.Widget", "annotations": [{ "type": "tendril.bean.Inject" }] }],
            "methods": [{ "name": "poke", "annotations": [{ "type": "tendril.bean.Inject" }] }]
        },
        {
            "name": "app.Color",
            "kind": "enum",
            "implements": ["tendril.bean.qualifier.BeanId"],
            "annotations": [{ "type": "tendril.bean.qualifier.BeanIdEnum" }],
            "entries": [{ "name": "RED" }]
        }
    ]
}"#;

#[test]
fn manifest_round_writes_recipes_and_reports_warnings() {
    let host = ManifestHost::from_str(BEANS).unwrap();
    let mut filer = MemoryFiler::new();
    let report = Processor::new(RecipeGenerator::default()).process(&host, &host, &host, &mut filer).unwrap();
    assert_eq!(report.written, ["app.HolderRecipe"]);
    assert_eq!(report.warnings, ["app.Holder::poke has no parameters, this is a meaningless injection"]);

    let text = filer.file("app.HolderRecipe").unwrap();
    assert!(text.contains("public class HolderRecipe extends SingletonRecipe<Holder> {"));
    assert!(text.contains("import tendril.bean.recipe.Applicator;\n"));
    assert!(text.contains("import tendril.bean.recipe.Injector;\n"));
}

#[test]
fn enum_ids_land_in_package_directories() {
    let host = ManifestHost::from_str(BEANS).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut filer = DirectoryFiler::new(dir.path());
    let report = Processor::new(EnumIdGenerator::default()).process(&host, &host, &host, &mut filer).unwrap();
    assert_eq!(report.written, ["app.ColorId"]);
    let text = std::fs::read_to_string(dir.path().join("app").join("ColorId.java")).unwrap();
    assert!(text.contains("public @interface ColorId {"));
    assert!(text.contains("    Color value();"));
}

#[test]
fn enum_without_the_id_capability_is_rejected_before_writing() {
    let host = ManifestHost::from_str(
        r#"{ "declarations": [{
            "name": "app.Color",
            "kind": "enum",
            "annotations": [{ "type": "tendril.bean.qualifier.BeanIdEnum" }]
        }] }"#,
    )
    .unwrap();
    let mut filer = MemoryFiler::new();
    let err = Processor::new(EnumIdGenerator::default())
        .process(&host, &host, &host, &mut filer)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unable to use app.Color - Must implement the tendril.bean.qualifier.BeanId interface"
    );
    assert_eq!(filer.opened(), 0);
}

#[test]
fn bean_annotated_interface_is_rejected() {
    let host = ManifestHost::from_str(
        r#"{ "declarations": [{
            "name": "app.Service",
            "kind": "interface",
            "annotations": [{ "type": "tendril.bean.Bean" }, { "type": "tendril.bean.Singleton" }]
        }] }"#,
    )
    .unwrap();
    let err = Processor::new(RecipeGenerator::default())
        .process(&host, &host, &host, &mut MemoryFiler::new())
        .unwrap_err();
    assert!(matches!(err, ProcessingError::StructuralValidation { .. }));
    assert_eq!(err.subject(), "app.Service");
}
