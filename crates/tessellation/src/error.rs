/// The tessellator's result type.
pub type TessellationResult<T> = Result<T, TessellationError>;

/// Describes an unexpected error happening during tessellation.
///
/// These indicate a broken invariant in the sweep rather than bad input.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InternalError {
    /// An edge that should be in the sweep line dictionary has no region.
    MissingRegion,
    /// A face with fewer than three edges was found where a polygon was expected.
    DegenerateFace,
    /// The mesh structure check failed after the sweep.
    InvalidMesh,
    /// The sweep processed more events than the input can produce.
    SweepDidNotTerminate,
}

impl core::fmt::Display for InternalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InternalError::MissingRegion => {
                std::write!(f, "Missing active region")
            }
            InternalError::DegenerateFace => {
                std::write!(f, "Degenerate face")
            }
            InternalError::InvalidMesh => {
                std::write!(f, "Invalid mesh")
            }
            InternalError::SweepDidNotTerminate => {
                std::write!(f, "The sweep did not terminate")
            }
        }
    }
}

impl std::error::Error for InternalError {}

/// The tessellator's error enumeration.
#[derive(Clone, Debug, PartialEq)]
pub enum TessellationError {
    UnsupportedParameter(UnsupportedParameter),
    Internal(InternalError),
}

impl core::fmt::Display for TessellationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TessellationError::UnsupportedParameter(e) => {
                std::write!(f, "Unsupported parameter: {e}")
            }
            TessellationError::Internal(e) => {
                std::write!(f, "Internal error: {e}")
            }
        }
    }
}

impl std::error::Error for TessellationError {}

impl core::convert::From<InternalError> for TessellationError {
    fn from(value: InternalError) -> Self {
        Self::Internal(value)
    }
}

impl core::convert::From<UnsupportedParameter> for TessellationError {
    fn from(value: UnsupportedParameter) -> Self {
        Self::UnsupportedParameter(value)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum UnsupportedParameter {
    PositionIsNaN,
    LineWidthIsNaN,
    NormalIsNaN,
}

impl core::fmt::Display for UnsupportedParameter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UnsupportedParameter::PositionIsNaN => {
                std::write!(f, "Position is not a number")
            }
            UnsupportedParameter::LineWidthIsNaN => {
                std::write!(f, "Line width is not a number")
            }
            UnsupportedParameter::NormalIsNaN => {
                std::write!(f, "Normal is not a number")
            }
        }
    }
}

impl std::error::Error for UnsupportedParameter {}
