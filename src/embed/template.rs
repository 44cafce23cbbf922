//! Compile-time templates with typed placeholders.
//!
//! Each template file carries `__NAME__` markers. A `TemplateVars` type owns
//! the set of markers for one file, so a page shell can never be rendered
//! with reload-script variables by mistake.

use std::marker::PhantomData;

/// Marker substitution for one embedded file.
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Embedded file paired with the variables it accepts.
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Name<'a>(&'a str);

    impl TemplateVars for Name<'_> {
        fn apply(&self, content: &str) -> String {
            content.replace("__NAME__", self.0)
        }
    }

    #[test]
    fn test_render_replaces_markers() {
        const GREETING: Template<Name<'static>> = Template::new("hello __NAME__, __NAME__");
        assert_eq!(GREETING.render(&Name("docs")), "hello docs, docs");
    }
}
