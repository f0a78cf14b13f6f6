//! Owned element tree produced by the loader.

/// One element of the recovered tree.
///
/// Only what the materializer reads is retained: the tag name, the character
/// data preceding the first child, and the children in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// Create an empty element with the given tag name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Tag name exactly as written in the source.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Character data before the first child, or `None` when there is none.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Direct children in document order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// First direct child whose tag name equals `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Text of the first direct child named `name`.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(Self::text)
    }

    /// Depth-first, document-order iteration over this element and every
    /// descendant whose tag name equals `name`.
    #[must_use]
    pub fn descendants<'a>(&'a self, name: &'a str) -> Descendants<'a> {
        Descendants {
            pending: vec![self],
            name,
        }
    }

    pub(super) fn push_text(&mut self, fragment: &str) {
        if !self.children.is_empty() || fragment.is_empty() {
            return;
        }
        match &mut self.text {
            Some(text) => text.push_str(fragment),
            None => self.text = Some(fragment.to_owned()),
        }
    }

    pub(super) fn push_child(&mut self, child: Self) {
        self.children.push(child);
    }
}

/// Iterator returned by [`Element::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    pending: Vec<&'a Element>,
    name: &'a str,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(element) = self.pending.pop() {
            self.pending.extend(element.children.iter().rev());
            if element.name == self.name {
                return Some(element);
            }
        }
        None
    }
}
