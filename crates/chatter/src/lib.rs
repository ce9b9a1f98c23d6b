#![forbid(unsafe_code)]

//! `chatter` turns a scripted conversation into a single self-playing animated SVG.
//!
//! Messages appear one after another with typing indicators, delivery status, reactions and
//! animated charts, and the whole document scrolls itself once the content outgrows the
//! viewport. Everything is computed up front; the output needs no script to play.
//!
//! # Features
//!
//! - `render` (default): layout, scheduling and SVG emission (`chatter::render`)

pub use chatter_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use chatter_render::model::{
        LayoutResult, ScrollKeyframe, ScrollPlan, TimedEvent, Timeline, TimelineItem,
        TimelineResult,
    };
    pub use chatter_render::text::{DeterministicTextMeasurer, TextMeasurer};
    pub use chatter_render::{
        EmbeddedFont, LayoutOptions, RenderOptions, build_timeline, build_timeline_with_rng,
        render_error_svg, render_input_error_svg, render_svg,
    };

    use base64::Engine as _;
    use chatter_core::{
        AvatarConfig, ChatConfig, ConversationEvent, Substitutions, ThemeName,
        parse_conversation_json,
    };
    use rand::Rng;
    use std::path::{Path, PathBuf};

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Core(#[from] chatter_core::Error),
        #[error(transparent)]
        Render(#[from] chatter_render::Error),
        #[error("failed to read {path}: {source}")]
        Io {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
    }

    impl HeadlessError {
        /// Issues to report individually, when this is a validation failure.
        fn config_issues(&self) -> Vec<String> {
            match self {
                HeadlessError::Core(chatter_core::Error::Config(e))
                | HeadlessError::Render(chatter_render::Error::Config(e)) => {
                    e.issues.iter().map(ToString::to_string).collect()
                }
                other => vec![other.to_string()],
            }
        }

        /// Whether the problem lies in the supplied conversation or substitutions rather than
        /// in the configuration.
        pub fn is_input(&self) -> bool {
            matches!(
                self,
                HeadlessError::Core(
                    chatter_core::Error::ConversationJson { .. }
                        | chatter_core::Error::Substitutions { .. }
                )
            )
        }
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Reads a font file and embeds it as base64. The CSS format hint follows the extension.
    pub fn load_font_file(path: &Path, family: &str) -> Result<EmbeddedFont> {
        let bytes = std::fs::read(path).map_err(|source| HeadlessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let format = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("woff") => "woff",
            Some("ttf") => "truetype",
            Some("otf") => "opentype",
            _ => "woff2",
        };
        Ok(EmbeddedFont {
            family: family.to_string(),
            format: format.to_string(),
            data_base64: base64::engine::general_purpose::STANDARD.encode(bytes),
        })
    }

    /// Like [`load_font_file`], but a missing or unreadable font only logs a warning and
    /// leaves the theme's generic font stack in charge.
    pub fn load_font_or_fallback(path: &Path, family: &str) -> Option<EmbeddedFont> {
        match load_font_file(path, family) {
            Ok(font) => Some(font),
            Err(err) => {
                tracing::warn!(error = %err, "font data unavailable; using the theme font stack");
                None
            }
        }
    }

    /// Renders `events`, failing on invalid configuration.
    pub fn try_generate_svg(
        events: &[ConversationEvent],
        config: &ChatConfig,
        vars: &Substitutions,
        options: &RenderOptions,
    ) -> Result<String> {
        try_generate_svg_with_rng(events, config, vars, options, &mut rand::thread_rng())
    }

    /// Like [`try_generate_svg`], drawing reading-time jitter from `rng`.
    pub fn try_generate_svg_with_rng<R: Rng + ?Sized>(
        events: &[ConversationEvent],
        config: &ChatConfig,
        vars: &Substitutions,
        options: &RenderOptions,
        rng: &mut R,
    ) -> Result<String> {
        Ok(chatter_render::render_conversation_with_rng(
            events, config, vars, options, rng,
        )?)
    }

    /// Renders `events`, substituting the error graphic for any failure.
    ///
    /// This never fails: the worst case is a small, clearly labeled error document.
    pub fn generate_svg(
        events: &[ConversationEvent],
        config: &ChatConfig,
        vars: &Substitutions,
        options: &RenderOptions,
    ) -> String {
        generate_svg_with_rng(events, config, vars, options, &mut rand::thread_rng())
    }

    pub fn generate_svg_with_rng<R: Rng + ?Sized>(
        events: &[ConversationEvent],
        config: &ChatConfig,
        vars: &Substitutions,
        options: &RenderOptions,
        rng: &mut R,
    ) -> String {
        match try_generate_svg_with_rng(events, config, vars, options, rng) {
            Ok(svg) => svg,
            Err(err) => error_document(&err),
        }
    }

    /// The error graphic for `err`, logging every underlying issue.
    pub fn error_svg(err: &HeadlessError) -> String {
        error_document(err)
    }

    fn error_document(err: &HeadlessError) -> String {
        let issues = err.config_issues();
        for issue in &issues {
            tracing::error!(%issue, "cannot render conversation");
        }
        let detail = issues.first().map(String::as_str).unwrap_or_default();
        if err.is_input() {
            render_input_error_svg(detail)
        } else {
            render_error_svg(detail)
        }
    }

    /// Bundles a configuration, substitutions and render options for repeated rendering.
    ///
    /// Per-request overrides (`with_theme`, `with_avatars`, ...) build a new configuration
    /// value; nothing shared is ever patched in place.
    #[derive(Debug, Clone, Default)]
    pub struct ChatRenderer {
        pub config: ChatConfig,
        pub vars: Substitutions,
        pub options: RenderOptions,
    }

    impl ChatRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_config(mut self, config: ChatConfig) -> Self {
            self.config = config;
            self
        }

        pub fn with_theme(mut self, theme: ThemeName) -> Self {
            self.config = self.config.with_theme(theme);
            self
        }

        pub fn with_avatars(mut self, avatars: AvatarConfig) -> Self {
            self.config = self.config.with_avatars(avatars);
            self
        }

        pub fn with_vars(mut self, vars: Substitutions) -> Self {
            self.vars = vars;
            self
        }

        pub fn with_font(mut self, font: Option<EmbeddedFont>) -> Self {
            self.options.font = font;
            self
        }

        pub fn with_document_id(mut self, id: impl Into<String>) -> Self {
            self.options.document_id = Some(id.into());
            self
        }

        /// The validated schedule and scroll plan, without emitting markup.
        pub fn timeline(&self, events: &[ConversationEvent]) -> Result<TimelineResult> {
            Ok(build_timeline(events, &self.config, &self.vars)?)
        }

        pub fn try_render(&self, events: &[ConversationEvent]) -> Result<String> {
            try_generate_svg(events, &self.config, &self.vars, &self.options)
        }

        pub fn render(&self, events: &[ConversationEvent]) -> String {
            generate_svg(events, &self.config, &self.vars, &self.options)
        }

        pub fn try_render_json(&self, conversation_json: &str) -> Result<String> {
            let events = parse_conversation_json(conversation_json)?;
            self.try_render(&events)
        }

        /// Parses and renders a JSON conversation; unreadable input yields the error graphic.
        pub fn render_json(&self, conversation_json: &str) -> String {
            match self.try_render_json(conversation_json) {
                Ok(svg) => svg,
                Err(err) => error_document(&err),
            }
        }
    }
}
