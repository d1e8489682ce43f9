//! # Weft Compiler
//!
//! Entry point of the compiler core: analyze a program tree, and when it is
//! free of errors, generate its data-model, API and UI specs.
//!
//! ```text
//! Program ──analyze──> ResolvedProgram ──generate──> TierSpecs
//!              │
//!              └──> diagnostics (errors block generation, warnings ride along)
//! ```

use weft_compiler_diagnostics::{build_diagnostic_message, Diagnostic, DiagnosticSeverity};
use weft_compiler_semantic::{analyze_program, AnalysisOptions};
use weft_compiler_syntax::Program;

pub use weft_compiler_ir::{generate_specs, PrettyPrint, TierSpecs};
pub use weft_project::{CodegenSettings, Database, Project};

/// Result type for compilation operations
pub type Result<T> = std::result::Result<T, CompilerError>;

/// Errors that can occur during compilation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompilerError {
    /// Two declarations of the same kind share a name; analysis stopped early
    #[error("Duplicate declarations: {} found", .0.len())]
    DuplicateDeclarations(Vec<Diagnostic>),
    /// Semantic validation errors occurred
    #[error("Semantic errors: {} errors found", .0.len())]
    SemanticErrors(Vec<Diagnostic>),
}

impl CompilerError {
    /// The error diagnostics, ranked.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::DuplicateDeclarations(diagnostics) | Self::SemanticErrors(diagnostics) => {
                diagnostics
            }
        }
    }
}

/// Options for compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Resolve declarations of a tier on the rayon pool
    pub parallel: bool,
    /// Passed through to the code generators
    pub codegen: CodegenSettings,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            codegen: CodegenSettings::default(),
        }
    }
}

impl CompilerOptions {
    /// Options carrying the code generation settings of a project.
    pub fn for_project(project: &Project) -> Self {
        Self {
            codegen: project.codegen.clone(),
            ..Self::default()
        }
    }
}

/// Compilation output including the tier specs and any warnings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOutput {
    pub specs: TierSpecs,
    /// Any warnings generated during compilation
    pub warnings: Vec<Diagnostic>,
    pub codegen: CodegenSettings,
}

/// Compiles a Weft program tree
///
/// # Arguments
/// * `program` - The program produced by a parser front-end or the builders
/// * `options` - Compilation options
///
/// # Returns
/// * `Ok(CompilerOutput)` - Tier specs of the program with any warnings
/// * `Err(CompilerError)` - Every error found, errors first in declaration order
pub fn compile_program(program: &Program, options: CompilerOptions) -> Result<CompilerOutput> {
    let _span = tracing::info_span!(
        "compile_program",
        declarations = program.declarations.len()
    )
    .entered();

    let analysis = analyze_program(
        program,
        &AnalysisOptions {
            parallel: options.parallel,
        },
    );

    let errors: Vec<_> = analysis
        .diagnostics
        .iter()
        .filter(|d| d.severity == DiagnosticSeverity::Error)
        .cloned()
        .collect();

    if analysis.aborted {
        return Err(CompilerError::DuplicateDeclarations(errors));
    }

    let resolved = match analysis.resolved {
        Some(resolved) if errors.is_empty() => resolved,
        _ => return Err(CompilerError::SemanticErrors(errors)),
    };

    let warnings: Vec<_> = analysis
        .diagnostics
        .iter()
        .filter(|d| d.severity == DiagnosticSeverity::Warning)
        .cloned()
        .collect();

    let specs = generate_specs(&resolved);
    if let Err(err) = specs.validate() {
        tracing::error!("generated specs are not closed: {err}");
    }
    tracing::info!(warnings = warnings.len(), "compilation succeeded");

    Ok(CompilerOutput {
        specs,
        warnings,
        codegen: options.codegen,
    })
}

/// Formats diagnostics for display
///
/// # Arguments
/// * `source_text` - The source code text
/// * `diagnostics` - The diagnostics to format
/// * `use_color` - Whether to use color in the output
///
/// # Returns
/// A formatted string containing all diagnostics
pub fn format_diagnostics(
    source_text: &str,
    diagnostics: &[Diagnostic],
    use_color: bool,
) -> String {
    diagnostics
        .iter()
        .map(|d| build_diagnostic_message(source_text, d, use_color))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Install a `fmt` subscriber on stderr for embedding binaries and tests.
/// Keeps any subscriber that is already installed.
pub fn init_tracing(level: tracing::Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
