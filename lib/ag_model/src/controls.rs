//! Declared UI controls, as extracted from the application layout resources
//! by the upstream engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A declared interactive widget: resource identity, containing layout,
/// owning screen, and the optional statically declared listener method name.
///
/// A control with no resolvable listener is kept around as unresolved for
/// reporting, never dropped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UiControlDecl {
    resource_id: u32,
    resource_name: String,
    layout_id: u32,
    layout_name: String,
    screen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    listener_name: Option<String>,
    /// Back-reference to the menu resource this item belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    owning_menu: Option<String>,
}

impl fmt::Display for UiControlDecl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}/{}#{:#x}",
            self.screen, self.resource_name, self.resource_id
        )
    }
}

impl UiControlDecl {
    pub fn new(
        resource_id: u32,
        resource_name: impl Into<String>,
        layout_id: u32,
        layout_name: impl Into<String>,
        screen: impl Into<String>,
    ) -> Self {
        Self {
            resource_id,
            resource_name: resource_name.into(),
            layout_id,
            layout_name: layout_name.into(),
            screen: screen.into(),
            listener_name: None,
            owning_menu: None,
        }
    }

    #[must_use]
    pub fn with_listener_name(mut self, name: impl Into<String>) -> Self {
        self.listener_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_owning_menu(mut self, menu: impl Into<String>) -> Self {
        self.owning_menu = Some(menu.into());
        self
    }

    #[inline]
    pub fn resource_id(&self) -> u32 {
        self.resource_id
    }

    #[inline]
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    #[inline]
    pub fn layout_id(&self) -> u32 {
        self.layout_id
    }

    #[inline]
    pub fn layout_name(&self) -> &str {
        &self.layout_name
    }

    #[inline]
    pub fn screen(&self) -> &str {
        &self.screen
    }

    #[inline]
    pub fn listener_name(&self) -> Option<&str> {
        self.listener_name.as_deref()
    }

    #[inline]
    pub fn owning_menu(&self) -> Option<&str> {
        self.owning_menu.as_deref()
    }

    /// Stable key identifying this control within one program: the owning
    /// screen plus the resource identity.
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }
}
