use thiserror::Error;

/// Errors from saving or restoring a project document
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("malformed document: {0}")]
    Malformed(String),
    #[error("root element is <{0}>, expected <project>")]
    NotAProject(String),
    #[error("binary document is truncated (declared {declared} bytes, found {found})")]
    Truncated { declared: usize, found: usize },
    #[error("invalid base64 in <{section}>: {source}")]
    Base64 {
        section: &'static str,
        #[source]
        source: base64::DecodeError,
    },
    #[error("failed to encode document: {0}")]
    Encode(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors reported by the external script evaluator
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScriptError {
    #[error("compile error: {0}")]
    Compile(String),
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Errors from explicit configuration calls on the pipeline
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("no effect with id '{0}'")]
    UnknownEffect(String),
    #[error("no parameter with id '{0}'")]
    UnknownParameter(String),
    #[error(transparent)]
    Script(#[from] ScriptError),
}
