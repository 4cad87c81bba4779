//! The ordered, nestable action tree built while a menu body runs.

use serde::Serialize;
use switchboard_types::ActionNode;

use crate::error::MenuError;

/// Ordered top-level actions plus the cursor of currently open containers.
///
/// The cursor is a path of sibling indices from the root to the innermost
/// open container. New nodes are appended to the children of that container,
/// or to the root sequence when no container is open. Opening and closing
/// are strictly paired by [`crate::ActionBuilder`], so nesting composes to
/// any depth.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VerbTree {
    actions: Vec<ActionNode>,
    #[serde(skip)]
    cursor: Vec<usize>,
}

impl VerbTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// The top-level actions in playback order.
    pub fn actions(&self) -> &[ActionNode] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ActionNode> {
        self.actions.iter()
    }

    /// Number of containers currently open.
    pub fn depth(&self) -> usize {
        self.cursor.len()
    }

    /// Appends `node` at the cursor and returns it.
    pub(crate) fn push(&mut self, node: ActionNode) -> Result<&mut ActionNode, MenuError> {
        let siblings = self.siblings_at_cursor()?;
        let index = siblings.len();
        siblings.push(node);
        Ok(&mut siblings[index])
    }

    /// Opens the most recently appended node at the cursor as a container.
    pub(crate) fn open_last(&mut self) -> Result<(), MenuError> {
        let siblings = self.siblings_at_cursor()?;
        let index = match siblings.last() {
            Some(node) if node.kind.is_container() => siblings.len() - 1,
            Some(node) => {
                return Err(MenuError::Invariant(format!(
                    "cannot nest actions inside {}",
                    node.kind
                )))
            }
            None => {
                return Err(MenuError::Invariant(
                    "no container to nest actions into".to_string(),
                ))
            }
        };
        self.cursor.push(index);
        Ok(())
    }

    /// Closes the innermost open container and returns it.
    pub(crate) fn close(&mut self) -> Result<&mut ActionNode, MenuError> {
        if self.cursor.pop().is_none() {
            return Err(MenuError::Invariant(
                "container closed without being opened".to_string(),
            ));
        }
        self.siblings_at_cursor()?
            .last_mut()
            .ok_or_else(|| MenuError::Invariant("closed container vanished".to_string()))
    }

    fn siblings_at_cursor(&mut self) -> Result<&mut Vec<ActionNode>, MenuError> {
        let mut siblings = &mut self.actions;
        for &index in &self.cursor {
            let node = siblings.get_mut(index).ok_or_else(|| {
                MenuError::Invariant(format!("open container {index} does not exist"))
            })?;
            if !node.kind.is_container() {
                return Err(MenuError::Invariant(format!(
                    "{} cannot hold nested actions",
                    node.kind
                )));
            }
            siblings = &mut node.children;
        }
        Ok(siblings)
    }
}

impl<'a> IntoIterator for &'a VerbTree {
    type Item = &'a ActionNode;
    type IntoIter = std::slice::Iter<'a, ActionNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
