//! # hushwave-core
//!
//! Domain types shared by the hushwave crates. Nothing in here touches audio
//! hardware or speech models:
//!
//! - [`preferences`] - the listener preference record handed over by the UI layer
//! - [`script`] - composition of a personalised session script from preferences
//! - [`settings`] - persisted application settings with effective defaults
//! - [`paths`] - data directory resolution

pub mod error;
pub mod paths;
pub mod preferences;
pub mod script;
pub mod settings;

pub use error::CoreError;
pub use paths::PathError;
pub use preferences::{Preferences, VoiceStyle};
pub use script::{QuickVariation, ScriptComposer};
pub use settings::{Settings, SettingsUpdate};
