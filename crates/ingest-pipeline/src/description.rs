//! Launch-syntax building blocks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An element with its properties, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    factory: String,
    properties: Vec<(String, String)>,
}

impl Element {
    /// Create an element of the given factory.
    pub fn new(factory: impl Into<String>) -> Self {
        Self {
            factory: factory.into(),
            properties: Vec::new(),
        }
    }

    /// Set a property.
    pub fn property(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.properties.push((key.into(), value.to_string()));
        self
    }

    /// Set the element name.
    pub fn named(self, name: impl ToString) -> Self {
        self.property("name", name)
    }

    fn render(&self) -> String {
        let mut out = self.factory.clone();
        for (key, value) in &self.properties {
            out.push_str("\n    ");
            out.push_str(key);
            out.push('=');
            out.push_str(value);
        }
        out
    }
}

/// A `!`-linked chain of elements and pad references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain {
    links: Vec<String>,
}

impl Chain {
    /// Start a chain at an element.
    pub fn from_element(element: Element) -> Self {
        Self {
            links: vec![element.render()],
        }
    }

    /// Start a chain at a pad reference such as `aout-cam1.src_3` or `t-cam1-0.`.
    pub fn from_pad(pad: impl Into<String>) -> Self {
        Self {
            links: vec![pad.into()],
        }
    }

    /// Link an element.
    pub fn then(mut self, element: Element) -> Self {
        self.links.push(element.render());
        self
    }

    /// Link a pad reference.
    pub fn then_pad(mut self, pad: impl Into<String>) -> Self {
        self.links.push(pad.into());
        self
    }

    /// Link a verbatim fragment supplied by the caller.
    pub fn then_fragment(mut self, fragment: &str) -> Self {
        let fragment = fragment.trim();
        if !fragment.is_empty() {
            self.links.push(fragment.to_string());
        }
        self
    }

    fn render(&self) -> String {
        self.links.join("\n! ")
    }
}

/// A complete launch description, one block per chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDescription {
    blocks: Vec<String>,
}

impl PipelineDescription {
    /// Create an empty description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chain.
    pub fn push(&mut self, chain: Chain) {
        self.blocks.push(chain.render());
    }

    /// Rendered chains in emission order.
    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    /// True when nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl fmt::Display for PipelineDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.blocks.join("\n\n"))
    }
}
