#![forbid(unsafe_code)]

//! Data model and configuration for self-playing chat animations.
//!
//! Everything here is plain data: conversation events, the closed set of themes, the
//! immutable [`ChatConfig`] and the `{placeholder}` substitution map. Layout, scheduling and
//! SVG emission live in `chatter-render`.

pub mod config;
pub mod conversation;
pub mod error;
pub mod substitute;
pub mod theme;

pub use config::{
    AnimationConfig, AvatarConfig, AvatarIdentity, AvatarShape, ChatConfig, ConfigFormat,
    LayoutConfig, ScrollConfig, StatusConfig, TimingConfig,
};
pub use conversation::{
    ChartData, ChartItem, ChartType, ConversationEvent, EventContent, EventKind, Sender,
    parse_conversation_json, parse_conversation_value,
};
pub use error::{ConfigError, ConfigIssue, Error, Result};
pub use substitute::Substitutions;
pub use theme::{ChartPalette, ChartStyles, ReactionStyle, Theme, ThemeName};
