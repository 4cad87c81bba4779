//! IVR menu state machine for the Switchboard platform.
//!
//! A host entity (a call) sits in one named menu at a time. Each menu is a
//! body registered on a [`MenuRegistry`]; evaluating the body against the
//! live entity with an [`ActionBuilder`] yields a [`VerbTree`] (what the
//! caller hears) and an [`OptionRegistry`] (which keypad input leads where).
//!
//! The [`MenuStateMachine`] owns the current menu name, which is the only
//! durable piece of state and is written through a [`MenuStore`]. Verb trees
//! and options are rebuilt from scratch on every render and every input pass.
//!
//! # Usage
//!
//! ```rust
//! use switchboard_menu::{MemoryMenuStore, MenuRegistry, MenuStateMachine, TwimlRenderer};
//! use switchboard_types::InputBag;
//!
//! struct Call {
//!     id: i64,
//! }
//!
//! let mut registry = MenuRegistry::new();
//! registry
//!     .register("opening_menu", |b, call: &Call| {
//!         b.gather(|b| {
//!             b.prompt(1, "Press 1 for the second menu", "second_menu");
//!         });
//!         b.say(format!("Call {}", call.id));
//!     })
//!     .register("second_menu", |b, _| {
//!         b.say("This is the second menu");
//!     });
//!
//! let mut call = Call { id: 7 };
//! let mut machine = MenuStateMachine::new(&registry, MemoryMenuStore::new())?;
//! let twiml = machine.render(&call, &TwimlRenderer)?;
//! assert!(twiml.contains("<Gather>"));
//!
//! machine.process_input(&mut call, InputBag::digits("1"))?;
//! assert_eq!(machine.current_menu().as_str(), "second_menu");
//! # Ok::<(), switchboard_menu::MenuError>(())
//! ```

mod builder;
mod error;
mod machine;
mod options;
mod registry;
mod render;
mod store;
mod tree;

pub use builder::{ActionBuilder, Verb};
pub use error::{CallbackError, MenuError};
pub use machine::{InputOutcome, MachineConfig, MenuStateMachine};
pub use options::{coerce_integer, Matcher, OptionEntry, OptionRegistry, Transition};
pub use registry::{Callback, MenuBody, MenuRegistry, DEFAULT_MENU};
pub use render::{JsonRenderer, Renderer, TwimlRenderer};
pub use store::{MemoryMenuStore, MenuStore, StoreError};
pub use tree::VerbTree;
