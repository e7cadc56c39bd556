//! Compiles line-oriented dialogue scripts into a graph of dialogue nodes.
//!
//! ```text
//! [start]
//! Alice:
//! Hello there.
//! 	Good, thanks!
//! 	[good_reply]
//! ```
//!
//! Labels end with `:`, commands start with `@`, `[tag]` names the next node
//! and indented lines form the choice block of the node just closed.

#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
use pyo3::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod ast;
pub mod bounded;
pub mod builder;
pub mod compiler;
pub mod error;
pub mod parser;
pub mod types;

pub use compiler::{CompileOptions, Compiler};
pub use error::{Error, Result};
pub use types::{Choice, Command, DialogueGraph, DialogueNode};

pub fn compile(text: &str) -> DialogueGraph {
    Compiler::new().compile(text)
}

pub fn compile_to_json(text: &str) -> Result<String> {
    compile(text).to_json()
}

#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
#[pyfunction]
fn compile_text(text: String) -> PyResult<String> {
    compile_to_json(&text)
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string()))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn compile_text_wasm(text: &str) -> std::result::Result<String, JsValue> {
    compile_to_json(text).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn compile_text_with_options_wasm(
    text: &str,
    options_json: &str,
) -> std::result::Result<String, JsValue> {
    let options =
        CompileOptions::from_json(options_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Compiler::with_options(options)
        .compile(text)
        .to_json()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
#[pymodule]
fn dlg_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compile_text, m)?)?;
    Ok(())
}
