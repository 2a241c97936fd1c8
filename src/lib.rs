//! # Inkpost
//!
//! A small static blog generator. A directory of Markdown posts becomes a
//! deployable tree of HTML, CSS, and media: one page per post, a home page
//! listing every post, and one page per tag.
//!
//! # Architecture: One Sequential Pass
//!
//! A build reads every input, transforms it, and writes every output in a
//! single synchronous pass. No state survives between builds except the
//! output directory itself.
//!
//! ```text
//! posts/*.md      → document → tags ─┐
//! styles/main.scss → styles (CSS) ───┼→ compose → build/index.html
//! templates/      ───────────────────┘            build/posts/<slug>.html
//!                                                 build/tags/<tag>.html
//! static/         → assets (copy)              → build/…
//! posts/**/media  → assets (hard link)         → build/medias/…
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`document`] | Parses `#+KEY: value` headed Markdown into [`types::Document`]s, rewrites media links under `/medias/`, lists and sorts the posts directory |
//! | [`tags`] | First-seen tag order and tag → documents grouping |
//! | [`styles`] | SCSS → CSS through a session confined to the styles root |
//! | [`highlight`] | syntect-based highlighting for code blocks and inline code |
//! | [`render`] | Content tree → HTML fragment, with code and video handling |
//! | [`compose`] | Two-layer page composition: page fragment inside `layout.html` |
//! | [`assets`] | Static tree copy and media hard-linking |
//! | [`build`] | The orchestrator: phase order and failure policy |
//! | [`config`] | `site.toml` loading and validation |
//! | [`output`] | Build events, the [`output::Reporter`], and summary formatting |
//! | [`types`] | Shared types (`Document`) and URL conventions |
//!
//! # Design Decisions
//!
//! ## Failures Are Scoped to Their Unit
//!
//! A document that fails to parse is left out; a post or tag page that fails
//! to render is skipped. Anything the whole site depends on (styles, the
//! home page, the static tree) aborts the build. The
//! [`build`] module documents the full table.
//!
//! ## Events, Not Prints
//!
//! Library code never writes to stdout. Every outcome is a
//! [`output::BuildEvent`] handed to a caller-owned [`output::Reporter`], which
//! tests inspect directly and the CLI echoes as log lines.
//!
//! ## Media Is Linked, Not Copied
//!
//! Media files stay next to the posts that use them. The build hard-links
//! them into `build/medias/`, and the parser has already pointed every image
//! and video link there, so both sides agree on the same URLs. Existing
//! links are never touched, which makes rebuilds cheap.
//!
//! ## Maud for Fixed Markup, Templates for the Layout
//!
//! Markup the generator owns (post headers, hero images, highlighted code)
//! is written with [Maud](https://maud.lambda.xyz/) and checked at compile
//! time. The site layout belongs to the author and lives in minijinja
//! templates under `templates/`.

pub mod assets;
pub mod build;
pub mod compose;
pub mod config;
pub mod document;
pub mod highlight;
pub mod output;
pub mod render;
pub mod styles;
pub mod tags;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
