//! Errors raised while wiring the engine to the browser.
//!
//! Rendering itself never fails; these only surface from setup and from
//! context recovery.

use wasm_bindgen::JsValue;

/// Setup and recovery failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrapherError {
	/// No `window` global.
	#[error("window is not available")]
	WindowNotAvailable,

	/// No `document` on the window.
	#[error("document is not available")]
	DocumentNotAvailable,

	/// The canvas refused to hand out a drawing context.
	#[error("{0} context is not available")]
	ContextUnavailable(&'static str),

	/// A shader did not compile.
	#[error("failed to compile {stage} shader: {log}")]
	ShaderCompile {
		/// `vertex` or `fragment`.
		stage: &'static str,
		/// Driver info log.
		log: String,
	},

	/// A program did not link.
	#[error("failed to link shader program: {0}")]
	ProgramLink(String),

	/// A GL object could not be created, usually because the context is lost.
	#[error("failed to create {0}")]
	ResourceCreation(&'static str),

	/// Any other exception thrown by a browser API.
	#[error("javascript error: {0}")]
	Js(String),
}

impl From<JsValue> for GrapherError {
	fn from(value: JsValue) -> Self {
		Self::Js(format!("{value:?}"))
	}
}

/// Result alias for setup operations.
pub type Result<T> = std::result::Result<T, GrapherError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_name_the_failure() {
		let err = GrapherError::ShaderCompile {
			stage: "fragment",
			log: "syntax error".into(),
		};
		assert_eq!(err.to_string(), "failed to compile fragment shader: syntax error");
		assert_eq!(
			GrapherError::ContextUnavailable("webgl").to_string(),
			"webgl context is not available"
		);
	}
}
