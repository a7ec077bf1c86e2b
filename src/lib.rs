pub mod ast;
pub mod generator;
pub mod ident;
pub mod parser;
pub mod props;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

/// A whole-document compilation failure. Parsing is best-effort and cannot
/// fail on malformed input, so this only surfaces defects caught at the
/// pipeline boundary; callers get no partial markup alongside it.
#[derive(Debug, Error)]
#[error("flow diagram compilation failed: {message}")]
pub struct CompileError {
    message: String,
}

/// Compile FlowDSL source text into Mermaid flowchart markup.
pub fn compile(source: &str) -> Result<String, CompileError> {
    // Run the pipeline inside catch_unwind so an unexpected panic becomes a
    // single error instead of unwinding into the caller.
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let diagram = parser::parse_diagram(source);
        generator::generate(&diagram)
    }));
    result.map_err(|payload| {
        let message = panic_message(payload.as_ref());
        tracing::error!(%message, "flow diagram compilation failed");
        CompileError { message }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown error".to_string()
    }
}
