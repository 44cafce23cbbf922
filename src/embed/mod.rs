//! Embedded static resources.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `transpile` - Page shell for generated documents (page.html)
//! - `serve` - Dev server resources (hotreload.js)
//!
//! # Usage
//!
//! ```ignore
//! use embed::transpile::{PAGE_HTML, PageVars};
//! use embed::serve::{HOTRELOAD_JS, HotreloadVars};
//!
//! let html = PAGE_HTML.render(&PageVars { title: "API", kind: "blueprint", body: "<p>..</p>" });
//! let js = HOTRELOAD_JS.render(&HotreloadVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod transpile {
    use super::{Template, TemplateVars};

    /// Variables for page.html. `title` must already be escaped.
    pub struct PageVars<'a> {
        pub title: &'a str,
        pub kind: &'a str,
        pub body: &'a str,
    }

    impl TemplateVars for PageVars<'_> {
        fn apply(&self, content: &str) -> String {
            // Body last, so markers inside document text are never expanded.
            content
                .replace("__TITLE__", self.title)
                .replace("__KIND__", self.kind)
                .replacen("__BODY__", self.body, 1)
        }
    }

    /// Full HTML page wrapping a transpiled document.
    pub const PAGE_HTML: Template<PageVars<'static>> =
        Template::new(include_str!("transpile/page.html"));
}

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL the reload client is served from (never touches the file system).
    pub const HOTRELOAD_PATH: &str = "/__docwatch/hotreload.js";

    /// Variables for hotreload.js.
    pub struct HotreloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for HotreloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__DOCWATCH_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Hot reload JavaScript with WebSocket port injection.
    pub const HOTRELOAD_JS: Template<HotreloadVars> =
        Template::new(include_str!("serve/hotreload.js"));

    /// `<script>` tag injected into served HTML pages.
    pub fn script_tag() -> String {
        format!(r#"<script src="{HOTRELOAD_PATH}" defer></script>"#)
    }
}
