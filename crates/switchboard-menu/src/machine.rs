//! The per-entity menu state machine.

use std::fmt;

use switchboard_types::{InputBag, MenuName, DIGITS_FIELD};
use tracing::{debug, info};

use crate::builder::Evaluation;
use crate::error::MenuError;
use crate::options::OptionRegistry;
use crate::registry::MenuRegistry;
use crate::render::Renderer;
use crate::store::MenuStore;
use crate::tree::VerbTree;

fn default_max_transition_chain() -> usize {
    32
}

/// Runtime tunables for a [`MenuStateMachine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    /// Maximum number of menus a single transition may cascade through
    /// before failing with `MenuError::TransitionLimit`.
    pub max_transition_chain: usize,

    /// Input bag field matched against options.
    pub input_field: String,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            max_transition_chain: default_max_transition_chain(),
            input_field: DIGITS_FIELD.to_string(),
        }
    }
}

/// What [`MenuStateMachine::process_input`] did with an input bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// The bag had no value in the configured input field.
    NoInput,
    /// No option accepted the input; the entity stays in its menu.
    NoMatch { input: String },
    /// An option matched and the entity moved. `to` is where the cascade
    /// settled, which may be past the option's own destination.
    Transitioned { from: MenuName, to: MenuName },
}

/// Tracks the current menu of one entity and drives rendering, transitions
/// and input matching.
///
/// Only the current menu name is durable; it is read from the store on
/// construction and written through the store on every transition. The
/// verb tree and options are rebuilt from the menu body on every pass.
///
/// A machine serves one request at a time. Hosts build one per request from
/// a shared [`MenuRegistry`] and a store bound to the entity.
pub struct MenuStateMachine<'r, E, S> {
    registry: &'r MenuRegistry<E>,
    store: S,
    config: MachineConfig,
    current: MenuName,
    tree: VerbTree,
    options: OptionRegistry<E>,
    last_input: Option<InputBag>,
}

impl<'r, E, S: MenuStore> MenuStateMachine<'r, E, S> {
    /// Creates a machine with the default [`MachineConfig`].
    ///
    /// # Errors
    ///
    /// Returns `MenuError::Persistence` if the store cannot be read.
    pub fn new(registry: &'r MenuRegistry<E>, store: S) -> Result<Self, MenuError> {
        Self::with_config(registry, store, MachineConfig::default())
    }

    /// Creates a machine, starting in the stored menu or the registry's
    /// default menu when the store holds none.
    ///
    /// # Errors
    ///
    /// Returns `MenuError::Persistence` if the store cannot be read.
    pub fn with_config(
        registry: &'r MenuRegistry<E>,
        store: S,
        config: MachineConfig,
    ) -> Result<Self, MenuError> {
        let current = match store.load()? {
            Some(menu) => menu,
            None => registry.default_menu().clone(),
        };
        debug!(menu = %current, "menu state machine loaded");

        Ok(Self {
            registry,
            store,
            config,
            current,
            tree: VerbTree::new(),
            options: OptionRegistry::new(),
            last_input: None,
        })
    }

    pub fn current_menu(&self) -> &MenuName {
        &self.current
    }

    /// The verb tree from the last evaluation.
    pub fn verbs(&self) -> &VerbTree {
        &self.tree
    }

    /// The options from the last evaluation.
    pub fn options(&self) -> &OptionRegistry<E> {
        &self.options
    }

    pub fn last_input(&self) -> Option<&InputBag> {
        self.last_input.as_ref()
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Discards transient state and re-evaluates the current menu.
    ///
    /// Transition requests made by the body are ignored here; preparing
    /// never changes the current menu.
    ///
    /// # Errors
    ///
    /// Returns `MenuError::NotFound` if the current menu is not registered,
    /// or any error the body raised.
    pub fn prepare(&mut self, entity: &E) -> Result<(), MenuError> {
        self.reset();
        let evaluation =
            self.registry
                .evaluate(&self.current, entity, self.last_input.as_ref())?;
        if let Some(requested) = &evaluation.requested {
            debug!(
                menu = %self.current,
                requested = %requested,
                "ignoring transition request outside of a transition"
            );
        }
        self.install(evaluation);
        Ok(())
    }

    /// Evaluates the current menu and hands the verb tree to `renderer`.
    ///
    /// # Errors
    ///
    /// See [`prepare`](Self::prepare).
    pub fn render<R: Renderer>(&mut self, entity: &E, renderer: &R) -> Result<R::Output, MenuError> {
        self.prepare(entity)?;
        Ok(renderer.render(&self.tree))
    }

    /// Moves the entity to `menu`, persists it, and evaluates the new body.
    ///
    /// If the new body requests a transition, it is followed in turn, up to
    /// `max_transition_chain` menus in total.
    ///
    /// # Errors
    ///
    /// - `MenuError::NotFound` if a target is not registered; the current
    ///   menu is left as it was before that step. Menus entered earlier in
    ///   the cascade stay entered and persisted.
    /// - `MenuError::Persistence` if the store rejects the write; the new
    ///   body is not evaluated.
    /// - `MenuError::TransitionLimit` if the cascade runs too long.
    pub fn transition_to(&mut self, entity: &E, menu: impl Into<MenuName>) -> Result<(), MenuError> {
        let mut target = menu.into();
        let mut chain: Vec<MenuName> = Vec::new();

        loop {
            if chain.len() >= self.config.max_transition_chain {
                chain.push(target);
                return Err(MenuError::TransitionLimit {
                    limit: self.config.max_transition_chain,
                    chain,
                });
            }

            self.registry.lookup(&target)?;
            self.store.save(&target)?;
            info!(from = %self.current, to = %target, "menu transition");
            self.current = target.clone();
            chain.push(target);

            self.reset();
            let evaluation =
                self.registry
                    .evaluate(&self.current, entity, self.last_input.as_ref())?;
            let requested = evaluation.requested.clone();
            self.install(evaluation);

            match requested {
                Some(next) => target = next,
                None => return Ok(()),
            }
        }
    }

    /// Alias of [`transition_to`](Self::transition_to).
    pub fn go_to_menu(&mut self, entity: &E, menu: impl Into<MenuName>) -> Result<(), MenuError> {
        self.transition_to(entity, menu)
    }

    /// Matches an input bag against the current menu's options.
    ///
    /// The first option whose matcher accepts the input wins: its callback
    /// runs with the whole input bag, then the entity transitions to its
    /// destination.
    ///
    /// # Errors
    ///
    /// - `MenuError::Callback` if the callback fails; no transition happens.
    /// - Any error from [`prepare`](Self::prepare) or
    ///   [`transition_to`](Self::transition_to).
    pub fn process_input(&mut self, entity: &mut E, input: InputBag) -> Result<InputOutcome, MenuError> {
        self.last_input = Some(input);
        self.prepare(entity)?;

        let raw = match self
            .last_input
            .as_ref()
            .and_then(|bag| bag.get(&self.config.input_field))
        {
            Some(raw) => raw.to_string(),
            None => {
                debug!(menu = %self.current, "no actionable input");
                return Ok(InputOutcome::NoInput);
            }
        };

        let Some(entry) = self.options.first_match(&raw) else {
            debug!(menu = %self.current, input = %raw, "input matched no option");
            return Ok(InputOutcome::NoMatch { input: raw });
        };
        let transition = entry.transition().clone();
        let callback = entry.callback().cloned();
        debug!(
            menu = %self.current,
            input = %raw,
            matcher = %entry.matcher(),
            destination = %transition.menu,
            "input matched option"
        );

        if let Some(callback) = callback {
            let name = transition.callback.clone().unwrap_or_default();
            let empty = InputBag::new();
            let bag = self.last_input.as_ref().unwrap_or(&empty);
            callback(entity, bag, &raw, transition.value.as_ref())
                .map_err(|source| MenuError::Callback { name, source })?;
        }

        let from = self.current.clone();
        self.transition_to(entity, transition.menu)?;
        Ok(InputOutcome::Transitioned {
            from,
            to: self.current.clone(),
        })
    }

    fn reset(&mut self) {
        self.tree = VerbTree::new();
        self.options = OptionRegistry::new();
    }

    fn install(&mut self, evaluation: Evaluation<E>) {
        self.tree = evaluation.tree;
        self.options = evaluation.options;
    }
}

impl<E, S: fmt::Debug> fmt::Debug for MenuStateMachine<'_, E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuStateMachine")
            .field("current", &self.current)
            .field("store", &self.store)
            .field("config", &self.config)
            .field("tree", &self.tree)
            .field("options", &self.options)
            .field("last_input", &self.last_input)
            .finish()
    }
}
