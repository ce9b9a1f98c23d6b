#![forbid(unsafe_code)]

//! Layout, scheduling, scroll synthesis and SVG emission for self-playing chat animations.
//!
//! The pipeline is strictly one-way: events are measured, scheduled onto an absolute timeline,
//! a scroll plan is derived from that timeline, and the emitter writes a single SVG document
//! whose animations all carry precomputed begin times.

pub mod layout;
pub mod model;
pub mod scroll;
pub mod svg;
pub mod text;
pub mod timeline;

pub use svg::{EmbeddedFont, RenderOptions, render_error_svg, render_input_error_svg, render_svg};

use crate::model::TimelineResult;
use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use crate::timeline::TimelineScheduler;
use chatter_core::{ChatConfig, ConversationEvent, Substitutions};
use rand::Rng;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] chatter_core::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct LayoutOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        }
    }
}

impl LayoutOptions {
    /// Deterministic measurer using the configured character width factor.
    pub fn for_config(config: &ChatConfig) -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::new(
                config.layout.char_width_factor,
            )),
        }
    }
}

/// Validates `config`, then measures, schedules and synthesizes scroll for `events`, drawing
/// jitter from `rng`.
pub fn build_timeline_with_rng<R: Rng + ?Sized>(
    events: &[ConversationEvent],
    config: &ChatConfig,
    vars: &Substitutions,
    options: &LayoutOptions,
    rng: &mut R,
) -> Result<TimelineResult> {
    config.validate()?;
    let timeline = TimelineScheduler::new(config, options.text_measurer.as_ref())
        .schedule(events, vars, rng);
    let scroll = scroll::synthesize(&timeline, timeline.viewport_height, config);
    Ok(TimelineResult { timeline, scroll })
}

pub fn build_timeline(
    events: &[ConversationEvent],
    config: &ChatConfig,
    vars: &Substitutions,
) -> Result<TimelineResult> {
    build_timeline_with_rng(
        events,
        config,
        vars,
        &LayoutOptions::for_config(config),
        &mut rand::thread_rng(),
    )
}

/// Validates `config`, then runs the whole pipeline and returns the SVG document.
pub fn render_conversation(
    events: &[ConversationEvent],
    config: &ChatConfig,
    vars: &Substitutions,
    options: &RenderOptions,
) -> Result<String> {
    render_conversation_with_rng(events, config, vars, options, &mut rand::thread_rng())
}

pub fn render_conversation_with_rng<R: Rng + ?Sized>(
    events: &[ConversationEvent],
    config: &ChatConfig,
    vars: &Substitutions,
    options: &RenderOptions,
    rng: &mut R,
) -> Result<String> {
    let result =
        build_timeline_with_rng(events, config, vars, &LayoutOptions::for_config(config), rng)?;
    Ok(render_svg(&result, config, options))
}
