//! Named menu bodies and option callbacks, registered once at startup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use switchboard_types::{AttrValue, InputBag, MenuName};

use crate::builder::{ActionBuilder, Evaluation};
use crate::error::{CallbackError, MenuError};

/// Menu used when the store holds no current menu and none was configured.
pub const DEFAULT_MENU: &str = "opening_menu";

/// A deferred menu body.
///
/// Bodies run against the live entity on every render and input pass, never
/// against a snapshot taken at registration.
pub type MenuBody<E> = Arc<dyn Fn(&mut ActionBuilder<'_, E>, &E) + Send + Sync>;

/// A side effect run before an option's transition.
///
/// Receives the entity, the full input bag of the request, the raw value
/// that selected the option, and the option's associated value.
pub type Callback<E> = Arc<
    dyn Fn(&mut E, &InputBag, &str, Option<&AttrValue>) -> Result<(), CallbackError>
        + Send
        + Sync,
>;

/// Mapping from menu name to body, plus the callbacks options may name.
///
/// Populated during setup and shared read-only afterwards; many state
/// machines can borrow one registry.
pub struct MenuRegistry<E> {
    menus: HashMap<MenuName, MenuBody<E>>,
    callbacks: HashMap<String, Callback<E>>,
    default_menu: MenuName,
}

impl<E> MenuRegistry<E> {
    pub fn new() -> Self {
        Self::with_default_menu(DEFAULT_MENU)
    }

    pub fn with_default_menu(default_menu: impl Into<MenuName>) -> Self {
        Self {
            menus: HashMap::new(),
            callbacks: HashMap::new(),
            default_menu: default_menu.into(),
        }
    }

    /// The menu an entity starts in when its store holds nothing.
    pub fn default_menu(&self) -> &MenuName {
        &self.default_menu
    }

    pub fn set_default_menu(&mut self, default_menu: impl Into<MenuName>) {
        self.default_menu = default_menu.into();
    }

    /// Registers `body` under `name`, replacing any earlier body.
    pub fn register<F>(&mut self, name: impl Into<MenuName>, body: F) -> &mut Self
    where
        F: Fn(&mut ActionBuilder<'_, E>, &E) + Send + Sync + 'static,
    {
        let name = name.into();
        if self.menus.insert(name.clone(), Arc::new(body)).is_some() {
            tracing::warn!(menu = %name, "menu body redefined");
        } else {
            tracing::debug!(menu = %name, "menu registered");
        }
        self
    }

    /// Registers a callback options can refer to by `name`.
    pub fn register_callback<F>(&mut self, name: impl Into<String>, callback: F) -> &mut Self
    where
        F: Fn(&mut E, &InputBag, &str, Option<&AttrValue>) -> Result<(), CallbackError>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        tracing::debug!(callback = %name, "callback registered");
        self.callbacks.insert(name, Arc::new(callback));
        self
    }

    /// Returns the body registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns `MenuError::NotFound` if no body is registered under `name`.
    pub fn lookup(&self, name: &MenuName) -> Result<&MenuBody<E>, MenuError> {
        self.menus
            .get(name)
            .ok_or_else(|| MenuError::NotFound(name.clone()))
    }

    pub fn contains(&self, name: &MenuName) -> bool {
        self.menus.contains_key(name)
    }

    pub fn callback(&self, name: &str) -> Option<&Callback<E>> {
        self.callbacks.get(name)
    }

    /// Registered menu names, sorted.
    pub fn menu_names(&self) -> Vec<&MenuName> {
        let mut names: Vec<&MenuName> = self.menus.keys().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    /// Runs the body registered under `name` against `entity`.
    pub(crate) fn evaluate(
        &self,
        name: &MenuName,
        entity: &E,
        input: Option<&InputBag>,
    ) -> Result<Evaluation<E>, MenuError> {
        let body = self.lookup(name)?;
        let mut builder = ActionBuilder::new(self, input);
        body(&mut builder, entity);
        let evaluation = builder.finish()?;
        tracing::debug!(
            menu = %name,
            actions = evaluation.tree.len(),
            options = evaluation.options.len(),
            "menu evaluated"
        );
        Ok(evaluation)
    }

    /// Evaluates every registered menu once against `entity` and verifies
    /// that every name it refers to resolves.
    ///
    /// Intended for startup: it catches option destinations and requested
    /// transitions that name unregistered menus, options naming unregistered
    /// callbacks, and an unregistered default menu. Branches a body does not
    /// take for this particular `entity` are not seen.
    ///
    /// # Errors
    ///
    /// Returns the first `MenuError` found.
    pub fn check(&self, entity: &E) -> Result<(), MenuError> {
        self.lookup(&self.default_menu)?;

        for name in self.menu_names() {
            let evaluation = self.evaluate(name, entity, None)?;
            for entry in evaluation.options.iter() {
                self.lookup(entry.destination())?;
            }
            if let Some(requested) = &evaluation.requested {
                self.lookup(requested)?;
            }
        }
        Ok(())
    }
}

impl<E> Default for MenuRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for MenuRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut callbacks: Vec<&String> = self.callbacks.keys().collect();
        callbacks.sort();
        f.debug_struct("MenuRegistry")
            .field("menus", &self.menu_names())
            .field("callbacks", &callbacks)
            .field("default_menu", &self.default_menu)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Transition;

    #[test]
    fn lookup_unknown_menu_is_not_found() {
        let registry: MenuRegistry<()> = MenuRegistry::new();
        match registry.lookup(&MenuName::new("nowhere")) {
            Err(MenuError::NotFound(name)) => assert_eq!(name.as_str(), "nowhere"),
            other => panic!("expected NotFound, got {:?}", other.err()),
        }
    }

    #[test]
    fn re_registering_overwrites() {
        let mut registry: MenuRegistry<()> = MenuRegistry::new();
        registry.register("opening_menu", |b, _| {
            b.say("first");
        });
        registry.register("opening_menu", |b, _| {
            b.say("second");
        });

        assert_eq!(registry.len(), 1);
        let evaluation = registry
            .evaluate(&MenuName::new("opening_menu"), &(), None)
            .expect("evaluation should succeed");
        assert_eq!(
            evaluation.tree.actions()[0].payload.as_deref(),
            Some("second")
        );
    }

    #[test]
    fn bodies_read_the_entity_at_evaluation_time() {
        let mut registry: MenuRegistry<u32> = MenuRegistry::new();
        registry.register("opening_menu", |b, id| {
            b.say(id.to_string());
        });

        let name = MenuName::new("opening_menu");
        let first = registry.evaluate(&name, &7, None).expect("evaluate");
        let second = registry.evaluate(&name, &8, None).expect("evaluate");
        assert_eq!(first.tree.actions()[0].payload.as_deref(), Some("7"));
        assert_eq!(second.tree.actions()[0].payload.as_deref(), Some("8"));
    }

    #[test]
    fn check_accepts_a_consistent_registry() {
        let mut registry: MenuRegistry<()> = MenuRegistry::new();
        registry
            .register_callback("note", |_, _, _, _| Ok(()))
            .register("opening_menu", |b, _| {
                b.press(1, Transition::to("second_menu").with_callback("note"));
            })
            .register("second_menu", |b, _| {
                b.say("done");
            });

        registry.check(&()).expect("registry should be consistent");
    }

    #[test]
    fn check_rejects_a_dangling_destination() {
        let mut registry: MenuRegistry<()> = MenuRegistry::new();
        registry.register("opening_menu", |b, _| {
            b.press(1, "missing_menu");
        });

        match registry.check(&()) {
            Err(MenuError::NotFound(name)) => assert_eq!(name.as_str(), "missing_menu"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn check_rejects_an_unregistered_default() {
        let mut registry: MenuRegistry<()> = MenuRegistry::with_default_menu("welcome");
        registry.register("opening_menu", |b, _| {
            b.say("hi");
        });

        assert!(matches!(registry.check(&()), Err(MenuError::NotFound(_))));
    }

    #[test]
    fn check_rejects_an_unknown_callback() {
        let mut registry: MenuRegistry<()> = MenuRegistry::new();
        registry.register("opening_menu", |b, _| {
            b.press(1, Transition::to("opening_menu").with_callback("ghost"));
        });

        assert!(matches!(
            registry.check(&()),
            Err(MenuError::UnknownCallback(_))
        ));
    }
}
