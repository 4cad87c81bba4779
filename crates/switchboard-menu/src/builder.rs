//! The verb-construction API that menu bodies call.

use switchboard_types::{ActionKind, ActionNode, AttrValue, Attributes, InputBag, MenuName};

use crate::error::MenuError;
use crate::options::{Matcher, OptionEntry, OptionRegistry, Transition};
use crate::registry::MenuRegistry;
use crate::tree::VerbTree;

/// The result of running one menu body.
pub(crate) struct Evaluation<E> {
    pub(crate) tree: VerbTree,
    pub(crate) options: OptionRegistry<E>,
    pub(crate) requested: Option<MenuName>,
}

/// Handle to the action just appended, for attaching attributes.
///
/// Holds nothing when the append failed; the failure is reported when the
/// body finishes, so attribute calls on an empty handle are no-ops.
pub struct Verb<'b> {
    node: Option<&'b mut ActionNode>,
}

impl<'b> Verb<'b> {
    /// Sets an attribute on the action, replacing any previous value.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        if let Some(node) = self.node.as_deref_mut() {
            node.attributes.insert(key.into(), value.into());
        }
        self
    }

    /// Sets several attributes at once.
    pub fn attrs<K, V>(mut self, attributes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<AttrValue>,
    {
        if let Some(node) = self.node.as_deref_mut() {
            for (key, value) in attributes {
                node.attributes.insert(key.into(), value.into());
            }
        }
        self
    }
}

/// Builds the action tree and option list for one evaluation of a menu body.
///
/// Container verbs ([`gather`](Self::gather), [`record`](Self::record),
/// [`dial_multiple`](Self::dial_multiple)) take a nested body; every action
/// appended inside it becomes a child of that container, and actions appended
/// after it returns become its siblings.
pub struct ActionBuilder<'a, E> {
    registry: &'a MenuRegistry<E>,
    input: Option<&'a InputBag>,
    tree: VerbTree,
    options: OptionRegistry<E>,
    requested: Option<MenuName>,
    fault: Option<MenuError>,
}

impl<'a, E> ActionBuilder<'a, E> {
    pub(crate) fn new(registry: &'a MenuRegistry<E>, input: Option<&'a InputBag>) -> Self {
        Self {
            registry,
            input,
            tree: VerbTree::new(),
            options: OptionRegistry::new(),
            requested: None,
            fault: None,
        }
    }

    /// The input bag from the last request, if the menu is being evaluated
    /// while processing one.
    pub fn input(&self) -> Option<&'a InputBag> {
        self.input
    }

    /// Actions appended so far.
    pub fn verbs(&self) -> &VerbTree {
        &self.tree
    }

    /// Options registered so far.
    pub fn options(&self) -> &OptionRegistry<E> {
        &self.options
    }

    /// Appends an action at the current nesting position.
    pub fn add_action(
        &mut self,
        kind: ActionKind,
        payload: Option<String>,
        attributes: Attributes,
    ) -> Verb<'_> {
        let node = ActionNode {
            kind,
            payload,
            attributes,
            children: Vec::new(),
        };
        match self.tree.push(node) {
            Ok(node) => Verb { node: Some(node) },
            Err(err) => {
                Self::record_fault(&mut self.fault, err);
                Verb { node: None }
            }
        }
    }

    /// Appends a container action and runs `body` with the container open.
    ///
    /// Fails the evaluation with [`MenuError::Invariant`] if `kind` cannot
    /// hold children.
    pub fn nest(
        &mut self,
        kind: ActionKind,
        attributes: Attributes,
        body: impl FnOnce(&mut Self),
    ) -> Verb<'_> {
        if !kind.is_container() {
            Self::record_fault(
                &mut self.fault,
                MenuError::Invariant(format!("{kind} cannot hold nested actions")),
            );
            return Verb { node: None };
        }

        if self.add_action(kind, None, attributes).node.is_none() {
            return Verb { node: None };
        }
        if let Err(err) = self.tree.open_last() {
            Self::record_fault(&mut self.fault, err);
            return Verb { node: None };
        }

        body(self);

        match self.tree.close() {
            Ok(node) => Verb { node: Some(node) },
            Err(err) => {
                Self::record_fault(&mut self.fault, err);
                Verb { node: None }
            }
        }
    }

    pub fn say(&mut self, text: impl Into<String>) -> Verb<'_> {
        self.add_action(ActionKind::Say, Some(text.into()), Attributes::new())
    }

    pub fn play(&mut self, url: impl Into<String>) -> Verb<'_> {
        self.add_action(ActionKind::Play, Some(url.into()), Attributes::new())
    }

    pub fn dial(&mut self, number: impl Into<String>) -> Verb<'_> {
        self.add_action(ActionKind::Dial, Some(number.into()), Attributes::new())
    }

    /// A number to ring; belongs inside [`dial_multiple`](Self::dial_multiple).
    pub fn number(&mut self, number: impl Into<String>) -> Verb<'_> {
        self.add_action(ActionKind::Number, Some(number.into()), Attributes::new())
    }

    /// Sends a text message; set `to` and `from` as attributes.
    pub fn sms(&mut self, text: impl Into<String>) -> Verb<'_> {
        self.add_action(ActionKind::SendMessage, Some(text.into()), Attributes::new())
    }

    pub fn redirect(&mut self, url: impl Into<String>) -> Verb<'_> {
        self.add_action(ActionKind::Redirect, Some(url.into()), Attributes::new())
    }

    pub fn pause(&mut self) -> Verb<'_> {
        self.add_action(ActionKind::Pause, None, Attributes::new())
    }

    pub fn hangup(&mut self) -> Verb<'_> {
        self.add_action(ActionKind::Hangup, None, Attributes::new())
    }

    pub fn gather(&mut self, body: impl FnOnce(&mut Self)) -> Verb<'_> {
        self.nest(ActionKind::Gather, Attributes::new(), body)
    }

    pub fn record(&mut self, body: impl FnOnce(&mut Self)) -> Verb<'_> {
        self.nest(ActionKind::Record, Attributes::new(), body)
    }

    pub fn dial_multiple(&mut self, body: impl FnOnce(&mut Self)) -> Verb<'_> {
        self.nest(ActionKind::DialMultiple, Attributes::new(), body)
    }

    /// Registers an option, then speaks `text`.
    pub fn prompt(
        &mut self,
        matcher: impl Into<Matcher>,
        text: impl Into<String>,
        transition: impl Into<Transition>,
    ) -> Verb<'_> {
        self.register_option(matcher, transition);
        self.say(text)
    }

    /// Registers an option without speaking anything.
    pub fn press(&mut self, matcher: impl Into<Matcher>, transition: impl Into<Transition>) {
        self.register_option(matcher, transition);
    }

    /// Appends an option to this evaluation's option list.
    ///
    /// A callback named by the transition is resolved against the registry
    /// here; an unknown name fails the evaluation.
    pub fn register_option(
        &mut self,
        matcher: impl Into<Matcher>,
        transition: impl Into<Transition>,
    ) {
        let transition = transition.into();
        let callback = match &transition.callback {
            Some(name) => match self.registry.callback(name) {
                Some(callback) => Some(callback.clone()),
                None => {
                    Self::record_fault(
                        &mut self.fault,
                        MenuError::UnknownCallback(name.clone()),
                    );
                    return;
                }
            },
            None => None,
        };
        self.options
            .push(OptionEntry::new(matcher.into(), transition, callback));
    }

    /// Asks to move to `menu` once this body finishes.
    ///
    /// Honoured only when the body runs as part of a transition; the last
    /// request wins.
    pub fn transition_to(&mut self, menu: impl Into<MenuName>) {
        self.requested = Some(menu.into());
    }

    pub(crate) fn finish(self) -> Result<Evaluation<E>, MenuError> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }
        if self.tree.depth() != 0 {
            return Err(MenuError::Invariant(format!(
                "{} container(s) left open",
                self.tree.depth()
            )));
        }
        Ok(Evaluation {
            tree: self.tree,
            options: self.options,
            requested: self.requested,
        })
    }

    fn record_fault(slot: &mut Option<MenuError>, err: MenuError) {
        tracing::debug!(error = %err, "menu body fault");
        slot.get_or_insert(err);
    }
}
