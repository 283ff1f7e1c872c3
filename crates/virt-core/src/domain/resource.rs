//! Namespaced resource references.
//!
//! A [`ResourceRef`] names one object in the cluster by `namespace` and
//! `name`.  Both parts end up as path segments in request URLs
//! (`.../namespaces/{namespace}/virtualmachines/{name}/vnc`), so they are
//! validated once, at construction time, with the same rule the Kubernetes
//! API server applies to path segment names:
//!
//! - must not be empty,
//! - must not be `.` or `..`,
//! - must not contain `/` or `%`.
//!
//! Existence of the resource is *not* checked here; a missing resource only
//! shows up as an HTTP error from the server.

use std::fmt;

use thiserror::Error;

/// Reasons a namespace or name is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResourceRefError {
    /// The namespace was empty.
    #[error("namespace must not be empty")]
    EmptyNamespace,

    /// The name was empty.
    #[error("name must not be empty")]
    EmptyName,

    /// The value is not usable as a single URL path segment.
    #[error("{field} {value:?} is not a valid path segment: {reason}")]
    InvalidPathSegment {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Identifies one namespaced resource, e.g. the VM `default/testvm`.
///
/// Immutable once constructed: the fields are private and only readable
/// through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    namespace: String,
    name: String,
}

impl ResourceRef {
    /// Builds a validated reference.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceRefError`] when either part is empty or is not a
    /// valid path segment.
    ///
    /// # Example
    ///
    /// ```rust
    /// use virt_core::ResourceRef;
    ///
    /// let vm = ResourceRef::new("default", "testvm").unwrap();
    /// assert_eq!(vm.to_string(), "default/testvm");
    /// assert!(ResourceRef::new("default", "").is_err());
    /// ```
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ResourceRefError> {
        let namespace = namespace.into();
        let name = name.into();

        if namespace.is_empty() {
            return Err(ResourceRefError::EmptyNamespace);
        }
        if name.is_empty() {
            return Err(ResourceRefError::EmptyName);
        }
        validate_path_segment("namespace", &namespace)?;
        validate_path_segment("name", &name)?;

        Ok(Self { namespace, name })
    }

    /// The namespace the resource lives in.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The resource name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Checks a single path segment.  Emptiness is reported by the caller with
/// the more specific `Empty*` variants.
pub fn validate_path_segment(field: &'static str, value: &str) -> Result<(), ResourceRefError> {
    let reason = if value == "." || value == ".." {
        Some("may not be '.' or '..'")
    } else if value.contains('/') {
        Some("may not contain '/'")
    } else if value.contains('%') {
        Some("may not contain '%'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ResourceRefError::InvalidPathSegment {
            field,
            value: value.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
