//! Drives one call from a line-oriented input stream.
//!
//! Every line is one request from the telephony platform: a connection is
//! checked out of the pool, the call is read back from the database, a fresh
//! state machine is built on it, the line is processed as `Digits`, and the
//! resulting document is written out.

use std::io::{BufRead, Write};

use switchboard_calls::{get_call, Call, CallError, SqliteMenuStore};
use switchboard_db::{checkout, DbPool, PoolError};
use switchboard_menu::{
    InputOutcome, JsonRenderer, MachineConfig, MenuError, MenuRegistry, MenuStateMachine,
    TwimlRenderer,
};
use switchboard_types::InputBag;
use thiserror::Error;

use crate::config::OutputFormat;

/// Errors that end a console session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("database error: {0}")]
    Database(#[from] PoolError),

    #[error("menu error: {0}")]
    Menu(#[from] MenuError),

    #[error("call error: {0}")]
    Call(#[from] CallError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a request needs besides the input itself.
pub struct Session<'a> {
    pub pool: &'a DbPool,
    pub registry: &'a MenuRegistry<Call>,
    pub machine_config: MachineConfig,
    pub format: OutputFormat,
    pub call_id: i64,
}

impl Session<'_> {
    /// Handles one request and returns the rendered document.
    ///
    /// `None` renders the current menu without processing any input.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if no connection is available, the call cannot
    /// be loaded, a menu fails, or the document cannot be encoded.
    pub fn step(&self, input: Option<InputBag>) -> Result<String, SessionError> {
        let conn = checkout(self.pool)?;
        let mut call = get_call(&conn, self.call_id)?;
        let mut machine = MenuStateMachine::with_config(
            self.registry,
            SqliteMenuStore::new(&conn, self.call_id),
            self.machine_config.clone(),
        )?;

        if let Some(input) = input {
            match machine.process_input(&mut call, input)? {
                InputOutcome::Transitioned { from, to } => {
                    tracing::info!(call_sid = %call.call_sid, %from, %to, "call moved");
                }
                InputOutcome::NoMatch { input } => {
                    tracing::info!(
                        call_sid = %call.call_sid,
                        menu = %machine.current_menu(),
                        input = %input,
                        "input matched no option"
                    );
                }
                InputOutcome::NoInput => {}
            }
        }

        let document = match self.format {
            OutputFormat::Twiml => machine.render(&call, &TwimlRenderer)?,
            OutputFormat::Json => {
                serde_json::to_string_pretty(&machine.render(&call, &JsonRenderer)?)?
            }
        };
        Ok(document)
    }

    /// Renders the opening document, then one document per input line until
    /// the input ends or a line reads `quit`.
    ///
    /// Blank lines re-render the current menu.
    ///
    /// # Errors
    ///
    /// Returns the first `SessionError` encountered.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<(), SessionError> {
        writeln!(output, "{}", self.step(None)?)?;

        for line in input.lines() {
            let line = line?;
            let digits = line.trim();
            if digits.eq_ignore_ascii_case("quit") {
                break;
            }
            let bag = (!digits.is_empty()).then(|| InputBag::digits(digits));
            writeln!(output, "{}", self.step(bag)?)?;
            output.flush()?;
        }
        Ok(())
    }
}
