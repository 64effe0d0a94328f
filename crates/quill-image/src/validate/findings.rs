//! Validation findings.

use quill_format::SectionKind;

/// Why a start-function section was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StartProblem {
    #[error("section names {0} functions, expected exactly one")]
    Count(usize),
    #[error("function must take no parameters and return nothing")]
    Signature,
}

/// What is wrong with an entry or section.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Reason {
    /// The same section kind appears more than once.
    #[error("duplicate section")]
    DuplicateSection,

    /// A cross-table index is past the end of its target table.
    #[error("{target} index {index} out of bounds (table has {len} entries)")]
    InvalidIndex {
        target: SectionKind,
        index: u32,
        len: usize,
    },

    /// An index entry names a module past the end of the Import-module
    /// section. Module 0 is the image itself.
    #[error("module index {module} out of bounds ({count} import modules)")]
    InvalidModule { module: u32, count: usize },

    /// An index section does not cover its whole public index space.
    #[error("section maps {actual} indices, expected {expected}")]
    IndexTableLength { expected: usize, actual: usize },

    /// An import names a module the Import-module section does not declare.
    #[error("module {name:?} is not declared in the import_module section")]
    UndeclaredModule { name: String },

    /// Two exports in the same namespace share a name.
    #[error("duplicate export name {name:?}")]
    DuplicateExportName { name: String },

    #[error("duplicate import module {name:?}")]
    DuplicateModuleName { name: String },

    #[error("function has no bytecode")]
    EmptyBytecode,

    /// Alignment is zero or not a power of two.
    #[error("invalid alignment {align}")]
    InvalidAlignment { align: u16 },

    /// Same as [`Reason::InvalidAlignment`], for one variable of a local
    /// variable list.
    #[error("variable {variable}: invalid alignment {align}")]
    InvalidVariableAlignment { variable: usize, align: u16 },

    #[error("invalid start function: {0}")]
    InvalidStartFunction(StartProblem),
}

/// One validation problem: the section, the entry within it (if any), and why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finding {
    pub section: SectionKind,
    pub index: Option<usize>,
    pub reason: Reason,
}

impl Finding {
    pub fn new(section: SectionKind, index: Option<usize>, reason: Reason) -> Self {
        Self {
            section,
            index,
            reason,
        }
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(i) => write!(f, "{} section, entry {i}: {}", self.section, self.reason),
            None => write!(f, "{} section: {}", self.section, self.reason),
        }
    }
}

/// Non-empty list of findings from one failing check class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Findings(Vec<Finding>);

impl Findings {
    /// `None` when there is nothing to report.
    pub(crate) fn from_vec(findings: Vec<Finding>) -> Option<Self> {
        if findings.is_empty() {
            None
        } else {
            Some(Self(findings))
        }
    }

    /// The fatal finding.
    pub fn first(&self) -> &Finding {
        &self.0[0]
    }

    /// Keep only the fatal finding.
    pub fn into_first(mut self) -> Self {
        self.0.truncate(1);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: there is at least one finding.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Finding] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Finding> {
        self.0
    }
}

impl std::fmt::Display for Findings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first())?;
        if self.len() > 1 {
            write!(f, " (and {} more)", self.len() - 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for Findings {}

impl IntoIterator for Findings {
    type Item = Finding;
    type IntoIter = std::vec::IntoIter<Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Findings {
    type Item = &'a Finding;
    type IntoIter = std::slice::Iter<'a, Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
