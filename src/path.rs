//! Error path representation for locating failures in nested structures.
//!
//! This module provides [`ErrorPath`] and [`PathSegment`]. Paths are built
//! outside-in: a child reports a failure relative to itself and every
//! composite parent prepends its own segment as the error travels upward.

use std::fmt::{self, Display};

/// A segment of an error path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// An object field (e.g., `address`)
    Field(String),
    /// A sequence index (e.g., `2`)
    Index(usize),
}

impl PathSegment {
    /// Creates a new field segment.
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    /// Creates a new index segment.
    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "{}", name),
            PathSegment::Index(idx) => write!(f, "{}", idx),
        }
    }
}

/// A path to the value that failed, relative to the schema that reports it.
///
/// Rendered segments are joined with `.`, indices included, so an element
/// failure inside a field reads `tags.2` and a field inside an element reads
/// `3.name`.
///
/// # Example
///
/// ```rust
/// use sift::ErrorPath;
///
/// let path = ErrorPath::root()
///     .prepend_field("city")
///     .prepend_index(0)
///     .prepend_field("addresses");
///
/// assert_eq!(path.to_string(), "addresses.0.city");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ErrorPath {
    segments: Vec<PathSegment>,
}

impl ErrorPath {
    /// Creates an empty path representing the value under the reporting schema.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path with `segment` in front of the existing segments.
    ///
    /// This method does not modify the original path; it returns a new one.
    pub fn prepend(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.push(segment);
        segments.extend(self.segments.iter().cloned());
        Self { segments }
    }

    /// Returns a new path with a field segment in front.
    pub fn prepend_field(&self, name: impl Into<String>) -> Self {
        self.prepend(PathSegment::Field(name.into()))
    }

    /// Returns a new path with an index segment in front.
    pub fn prepend_index(&self, index: usize) -> Self {
        self.prepend(PathSegment::Index(index))
    }

    /// Returns true if this is the root path (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the path segments, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Returns the innermost segment, or None if this is root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Renders the path as a key, or None at the root.
    pub fn key(&self) -> Option<String> {
        if self.is_root() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl Display for ErrorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}
