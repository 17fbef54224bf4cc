use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ApiError, Gateway};
use crate::constants::{ROOT_NODE_TITLE, ROOT_NODE_UUID};

pub const CURRENT_ALIAS: &str = ".";
pub const PARENT_ALIAS: &str = "..";

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("'{title}' ({uuid}) is not a folder")]
    NotAFolder { uuid: String, title: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    Root,
    Current,
    Parent,
    Node(&'a str),
}

impl<'a> Target<'a> {
    pub fn parse(token: Option<&'a str>) -> Self {
        match token {
            None | Some(ROOT_NODE_UUID) => Target::Root,
            Some(CURRENT_ALIAS) => Target::Current,
            Some(PARENT_ALIAS) => Target::Parent,
            Some(uuid) => Target::Node(uuid),
        }
    }
}

/// The folder the shell is "in".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    current_uuid: String,
    current_title: String,
}

impl Default for Navigation {
    fn default() -> Self {
        Self::root()
    }
}

impl Navigation {
    pub fn root() -> Self {
        Self {
            current_uuid: ROOT_NODE_UUID.to_string(),
            current_title: ROOT_NODE_TITLE.to_string(),
        }
    }

    pub fn current_uuid(&self) -> &str {
        &self.current_uuid
    }

    pub fn current_title(&self) -> &str {
        &self.current_title
    }

    pub fn is_root(&self) -> bool {
        self.current_uuid == ROOT_NODE_UUID
    }

    fn set(&mut self, uuid: &str, title: &str) {
        self.current_uuid = uuid.to_string();
        self.current_title = title.to_string();
    }

    /// Moves to `target`. Everything is fetched before anything is assigned,
    /// so a failed lookup leaves the current folder untouched.
    pub fn change_directory(
        &mut self,
        gateway: &dyn Gateway,
        target: Target<'_>,
    ) -> Result<(), NavigationError> {
        match target {
            Target::Root => *self = Self::root(),
            Target::Current => {}
            Target::Parent => {
                if self.is_root() {
                    return Ok(());
                }
                let current = gateway.get_node(&self.current_uuid)?;
                if is_root_uuid(&current.parent) {
                    *self = Self::root();
                } else {
                    let parent = gateway.get_node(&current.parent)?;
                    self.set(&parent.uuid, &parent.title);
                }
            }
            Target::Node(uuid) => {
                let node = gateway.get_node(uuid)?;
                if !node.is_folder() {
                    return Err(NavigationError::NotAFolder {
                        uuid: node.uuid,
                        title: node.title,
                    });
                }
                self.set(&node.uuid, &node.title);
            }
        }
        debug!(uuid = %self.current_uuid, title = %self.current_title, "changed directory");
        Ok(())
    }

    /// Turns `.`, `..` and the root marker into a concrete uuid. Other tokens
    /// are returned unchanged.
    pub fn resolve_alias(&self, gateway: &dyn Gateway, token: &str) -> Result<String, ApiError> {
        match Target::parse(Some(token)) {
            Target::Root => Ok(ROOT_NODE_UUID.to_string()),
            Target::Current => Ok(self.current_uuid.clone()),
            Target::Parent if self.is_root() => Ok(ROOT_NODE_UUID.to_string()),
            Target::Parent => {
                let current = gateway.get_node(&self.current_uuid)?;
                if is_root_uuid(&current.parent) {
                    Ok(ROOT_NODE_UUID.to_string())
                } else {
                    Ok(current.parent)
                }
            }
            Target::Node(uuid) => Ok(uuid.to_string()),
        }
    }

    /// Rebuilds the navigation saved by a previous run. An unreachable node
    /// sends the shell back to root.
    pub fn restore(gateway: &dyn Gateway, uuid: &str) -> Self {
        if is_root_uuid(uuid) {
            return Self::root();
        }
        match gateway.get_node(uuid) {
            Ok(node) => Self {
                current_uuid: node.uuid,
                current_title: node.title,
            },
            Err(err) => {
                warn!("could not restore folder {uuid}: {err}; starting at root");
                Self::root()
            }
        }
    }
}

fn is_root_uuid(uuid: &str) -> bool {
    uuid.is_empty() || uuid == ROOT_NODE_UUID
}
