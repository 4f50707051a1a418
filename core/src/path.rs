//! Instance path buffer for error pointers.

/// Mutable stack of path segments pointing into the instance under
/// validation.
///
/// One buffer exists per top-level validation. It grows as validation
/// descends into properties and array elements and shrinks on the way back
/// out; every recursive call site restores the depth it found, including on
/// failure.
///
/// Rendering inserts no escaping for `/` or `~` in segments.
///
/// # Examples
///
/// ```
/// use conforma_core::InstancePath;
///
/// let mut path = InstancePath::new();
/// assert_eq!(path.render(), "#/");
///
/// path.push("a");
/// path.push("0");
/// assert_eq!(path.render(), "#/a/0");
///
/// path.pop();
/// assert_eq!(path.render(), "#/a");
/// ```
#[derive(Debug, Default)]
pub struct InstancePath {
    segments: Vec<String>,
}

impl InstancePath {
    /// Creates an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a segment. Sequence indices are pushed as decimal strings.
    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Removes the most recently pushed segment.
    pub fn pop(&mut self) {
        self.segments.pop();
    }

    /// Returns the current depth.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if no segments have been pushed.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Renders the path as `#/seg0/seg1/…`; the empty path renders as `#/`.
    pub fn render(&self) -> String {
        format!("#/{}", self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_renders_root() {
        assert_eq!(InstancePath::new().render(), "#/");
    }

    #[test]
    fn test_push_pop_balance() {
        let mut path = InstancePath::new();
        path.push("items");
        path.push("3");
        assert_eq!(path.render(), "#/items/3");
        assert_eq!(path.depth(), 2);

        path.pop();
        path.pop();
        assert!(path.is_empty());
        assert_eq!(path.render(), "#/");
    }

    #[test]
    fn test_pop_on_empty_is_harmless() {
        let mut path = InstancePath::new();
        path.pop();
        assert!(path.is_empty());
    }
}
