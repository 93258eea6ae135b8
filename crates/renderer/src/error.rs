use crate::path::ParseError;
use crate::scene::MarkType;

use thiserror::Error;

/// Errors surfaced by the renderer.
///
/// Tessellation failures never show up here: the geometry cache replaces the
/// faulty shape with an empty geometry and rendering continues.
#[non_exhaustive]
#[derive(Error, Clone, Debug, PartialEq)]
pub enum RenderError {
    #[error("Invalid path data in a {mark:?} item: {source}")]
    Path {
        mark: MarkType,
        #[source]
        source: ParseError,
    },
    #[error("Invalid path data: {0}")]
    Parse(#[from] ParseError),
    #[error("The renderer was used before being initialized.")]
    NotInitialized,
}

impl RenderError {
    pub(crate) fn in_mark(self, mark: MarkType) -> Self {
        match self {
            RenderError::Parse(source) => RenderError::Path { mark, source },
            other => other,
        }
    }
}
