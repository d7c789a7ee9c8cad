use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(
        "Line `{line}` is not recognized for rendering.\n\
         Lines must either:\n\
         \t* be the name of a previously assigned single variable\n\
         \t* be an arithmetic variable assignment (i.e. a calculation that uses `=` in the line)\n\
         \t* be a conditional arithmetic assignment (i.e. uses `if`, `elif`, or `else`, each on a single line)\n\
         \t* be a single parameter declaration"
    )]
    Grammar { line: String },

    #[error("Name `{name}` in line `{line}` has no calculated result")]
    MissingResult { name: String, line: String },

    #[error("Malformed expression: {detail}")]
    Syntax { detail: String },
}

impl EngineError {
    pub fn missing(name: &str, line: &str) -> Self {
        EngineError::MissingResult {
            name: name.to_string(),
            line: line.to_string(),
        }
    }

    pub fn syntax(detail: impl Into<String>) -> Self {
        EngineError::Syntax {
            detail: detail.into(),
        }
    }
}
