use core::fmt;

/// Formatting stage where a [`LayoutError`] originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutPhase {
    /// Constraint validation before any text is touched.
    Config,
    /// Line wrapping against the width budget.
    Wrap,
    /// Slide packing.
    Paginate,
}

impl fmt::Display for LayoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Config => "config",
            Self::Wrap => "wrap",
            Self::Paginate => "paginate",
        };
        f.write_str(label)
    }
}

/// Structured error for layout operations.
///
/// These only surface for caller mistakes (for example a non-positive width
/// budget). Malformed source text never produces an error; it degrades to
/// plain, unannotated text instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutError {
    /// Processing phase where this error originated.
    pub phase: LayoutPhase,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: Box<str>,
    /// Optional offending value, rendered for diagnostics.
    pub value: Option<i64>,
}

impl LayoutError {
    pub(crate) fn new(phase: LayoutPhase, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            phase,
            code,
            message: message.into().into_boxed_str(),
            value: None,
        }
    }

    pub(crate) fn with_value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.phase, self.code, self.message)?;
        if let Some(value) = self.value {
            write!(f, " [value={}]", value)?;
        }
        Ok(())
    }
}

impl std::error::Error for LayoutError {}
