//! Formatting command bus.
//!
//! Toolbars issue formatting commands addressed to an element id without
//! holding a reference to the editing surface behind it; surfaces attach
//! and detach as elements enter and leave edit mode. Commands for ids with
//! no attached surface are dropped silently (no queuing). In the other
//! direction, the bus broadcasts selection-format changes to any number of
//! subscribers.

use crate::document::{FormatChange, Mark, SelectionFormat};
use std::collections::HashMap;
use std::sync::{Mutex, RwLock, Weak};

/// A formatting intent addressed to one element's editing surface.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatCommand {
    ToggleBold,
    ToggleItalic,
    ToggleUnderline,
    SetFontFamily(String),
    /// Font size in pixels.
    SetFontSize(f64),
    /// Text color as a hex string.
    SetColor(String),
}

impl FormatCommand {
    /// Translate into the document model's formatting change.
    pub fn to_change(&self) -> FormatChange {
        match self {
            FormatCommand::ToggleBold => FormatChange::Toggle(Mark::Bold),
            FormatCommand::ToggleItalic => FormatChange::Toggle(Mark::Italic),
            FormatCommand::ToggleUnderline => FormatChange::Toggle(Mark::Underline),
            FormatCommand::SetFontFamily(family) => FormatChange::SetFontFamily(family.clone()),
            FormatCommand::SetFontSize(px) => FormatChange::SetFontSize(*px),
            FormatCommand::SetColor(color) => FormatChange::SetColor(color.clone()),
        }
    }
}

/// Selection-format broadcast payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionFormatEvent {
    pub element_id: String,
    pub format: SelectionFormat,
}

/// Receiver side of a command delivery.
pub trait FormatTarget: Send {
    /// Apply a command and report the selection format afterwards.
    fn apply_command(&mut self, command: &FormatCommand) -> SelectionFormat;
}

type SharedTarget = Weak<Mutex<dyn FormatTarget>>;
type Subscriber = Box<dyn Fn(&SelectionFormatEvent) + Send + Sync>;

/// The decoupled channel between toolbars and editing surfaces.
#[derive(Default)]
pub struct FormatBus {
    targets: RwLock<HashMap<String, SharedTarget>>,
    subscribers: RwLock<Vec<Subscriber>>,
}

impl FormatBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the editing surface currently owning `element_id`.
    ///
    /// The bus only keeps a weak reference; a dropped surface detaches
    /// itself implicitly.
    pub fn attach(&self, element_id: impl Into<String>, target: SharedTarget) {
        if let Ok(mut targets) = self.targets.write() {
            targets.insert(element_id.into(), target);
        }
    }

    /// Detach whatever surface is listening for `element_id`.
    pub fn detach(&self, element_id: &str) {
        if let Ok(mut targets) = self.targets.write() {
            targets.remove(element_id);
        }
    }

    /// Deliver a command to the surface attached for `element_id`.
    ///
    /// Delivery is at-most-once; if no surface is attached the command is
    /// dropped without error. After a successful delivery the resulting
    /// selection format is broadcast to subscribers.
    pub fn send(&self, element_id: &str, command: FormatCommand) {
        let target = self
            .targets
            .read()
            .ok()
            .and_then(|targets| targets.get(element_id).cloned());
        let Some(target) = target else {
            log::debug!("dropping {:?}: no surface for {}", command, element_id);
            return;
        };
        let Some(target) = target.upgrade() else {
            // Surface is gone; forget the stale attachment.
            self.detach(element_id);
            log::debug!("dropping {:?}: surface for {} was dropped", command, element_id);
            return;
        };
        let format = match target.lock() {
            Ok(mut surface) => surface.apply_command(&command),
            Err(poisoned) => {
                log::error!("surface lock poisoned for {}", element_id);
                poisoned.into_inner().apply_command(&command)
            }
        };
        self.broadcast(&SelectionFormatEvent {
            element_id: element_id.to_string(),
            format,
        });
    }

    /// Register a selection-format subscriber. Subscribers are independent
    /// and each sees every broadcast.
    pub fn subscribe(&self, subscriber: impl Fn(&SelectionFormatEvent) + Send + Sync + 'static) {
        if let Ok(mut subscribers) = self.subscribers.write() {
            subscribers.push(Box::new(subscriber));
        }
    }

    /// Broadcast a selection-format change to all subscribers, in
    /// registration order.
    pub fn broadcast(&self, event: &SelectionFormatEvent) {
        if let Ok(subscribers) = self.subscribers.read() {
            for subscriber in subscribers.iter() {
                subscriber(event);
            }
        }
    }
}
