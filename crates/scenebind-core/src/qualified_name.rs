use std::fmt;

/// A `::`-separated name of something bound into the host namespace.
///
/// The first namespace segment is the host module (`core`, `render_scalar_rgb`),
/// any following segments are sub-namespaces (`mueller`).
///
/// # Examples
///
/// ```
/// use scenebind_core::QualifiedName;
///
/// let mesh = QualifiedName::new("Mesh", vec!["render_scalar_rgb".into()]);
/// assert_eq!(mesh.to_string(), "render_scalar_rgb::Mesh");
///
/// let rotator = QualifiedName::from_qualified_string("render_scalar_rgb::mueller::rotator");
/// assert_eq!(rotator.module(), Some("render_scalar_rgb"));
/// assert_eq!(rotator.simple_name(), "rotator");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    /// Simple name (e.g. "Mesh", "rotator").
    pub name: String,
    /// Namespace path, outermost first. Empty for the host's global scope.
    pub namespace: Vec<String>,
}

impl QualifiedName {
    pub fn new(name: impl Into<String>, namespace: Vec<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
        }
    }

    /// A name in the host's global scope.
    pub fn global(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// A name bound directly in a host module.
    pub fn in_module(module: &str, name: impl Into<String>) -> Self {
        Self::new(name, vec![module.to_string()])
    }

    /// Parse `a::b::c`. A leading `::` is ignored.
    pub fn from_qualified_string(s: &str) -> Self {
        let mut parts: Vec<String> = s
            .split("::")
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        match parts.pop() {
            Some(name) => Self::new(name, parts),
            None => Self::global(""),
        }
    }

    pub fn is_global(&self) -> bool {
        self.namespace.is_empty()
    }

    pub fn simple_name(&self) -> &str {
        &self.name
    }

    pub fn namespace_path(&self) -> &[String] {
        &self.namespace
    }

    /// The host module this name lives in, if any.
    pub fn module(&self) -> Option<&str> {
        self.namespace.first().map(String::as_str)
    }

    /// Compute the interface id for this name.
    pub fn to_interface_id(&self) -> crate::InterfaceId {
        crate::InterfaceId::from_name(&self.to_string())
    }

    /// `render::mueller` + `rotator` = `render::mueller::rotator`.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut namespace = self.namespace.clone();
        namespace.push(self.name.clone());
        Self::new(name, namespace)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.namespace {
            write!(f, "{segment}::")?;
        }
        write!(f, "{}", self.name)
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        Self::from_qualified_string(s)
    }
}
