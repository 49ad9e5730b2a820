//! Line-oriented operator console.
//!
//! Stand-in for the station's button panel: one command per line, two
//! preamp toggles bound to the override relays. Toggle display state is
//! updated from relay change notifications, the same way a checkbox is
//! selected or deselected when a configuration switches its relay.

use antsw_common::relay::{RelayId, ToggleId};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::binding::{OverrideBinding, RelayChange};
use crate::engine::{ConfigurationEngine, EngineError};

/// Toggle mirroring the 70cm preamp relay.
pub const TOGGLE_PREAMP_70CM: ToggleId = ToggleId(70);

/// Toggle mirroring the 2m preamp relay.
pub const TOGGLE_PREAMP_2M: ToggleId = ToggleId(2);

const HELP: &str = "\
Commands:
  list                      list configurations
  status                    show relay and toggle states
  activate <config>         select a configuration (key, label or list number)
  preamp <70cm|2m> <on|off> override a preamp
  identify                  walk every relay on, then off
  help                      this text
  quit | exit               release all relays and leave";

/// One parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List configurations.
    List,
    /// Show relay and toggle states.
    Status,
    /// Select a configuration by key, label or 1-based list number.
    Activate(String),
    /// Override a preamp relay.
    Preamp {
        /// Preamp relay
        relay: RelayId,
        /// Requested state
        on: bool,
    },
    /// Run the relay identification walk.
    Identify,
    /// Print the command summary.
    Help,
    /// Leave the console.
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (verb, rest) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        let rest = rest.trim();

        match verb.to_ascii_lowercase().as_str() {
            "list" | "ls" => Ok(Self::List),
            "status" | "st" => Ok(Self::Status),
            "identify" => Ok(Self::Identify),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            "activate" | "a" => {
                if rest.is_empty() {
                    Err("activate needs a configuration".to_string())
                } else {
                    Ok(Self::Activate(rest.to_string()))
                }
            }
            "preamp" | "p" => {
                let mut args = rest.split_whitespace();
                let (Some(band), Some(state), None) = (args.next(), args.next(), args.next())
                else {
                    return Err("usage: preamp <70cm|2m> <on|off>".to_string());
                };
                Ok(Self::Preamp {
                    relay: parse_preamp(band)?,
                    on: parse_switch(state)?,
                })
            }
            other => Err(format!("unknown command {other:?} (try 'help')")),
        }
    }
}

fn parse_preamp(s: &str) -> Result<RelayId, String> {
    match s.to_ascii_lowercase().as_str() {
        "70cm" | "70" | "uhf" => Ok(RelayId::Preamp70),
        "2m" | "2" | "vhf" => Ok(RelayId::Preamp2m),
        other => match other.parse::<RelayId>() {
            Ok(relay) if relay.is_override() => Ok(relay),
            _ => Err(format!("unknown preamp {s:?}, expected 70cm or 2m")),
        },
    }
}

fn parse_switch(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "1" | "true" => Ok(true),
        "off" | "0" | "false" => Ok(false),
        _ => Err(format!("expected on or off, got {s:?}")),
    }
}

/// Whether the console keeps reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// Stop reading.
    Quit,
}

/// Displayed toggle states, shared with the change listener.
type ToggleBoard = Rc<RefCell<BTreeMap<ToggleId, bool>>>;

/// Operator console writing to `W`.
pub struct Console<W: Write> {
    out: W,
    toggles: ToggleBoard,
    dwell: Duration,
}

impl<W: Write> Console<W> {
    /// Bind the preamp toggles to `engine` and subscribe to relay changes.
    ///
    /// `dwell` is the pause between identification walk steps.
    pub fn attach(
        engine: &mut ConfigurationEngine,
        out: W,
        dwell: Duration,
    ) -> Result<Self, EngineError> {
        let toggles: ToggleBoard = Rc::default();

        for (relay, toggle) in [
            (RelayId::Preamp70, TOGGLE_PREAMP_70CM),
            (RelayId::Preamp2m, TOGGLE_PREAMP_2M),
        ] {
            engine.attach_override(OverrideBinding::new(relay, toggle))?;
            toggles.borrow_mut().insert(toggle, engine.relay_state(relay));
        }

        let board = Rc::clone(&toggles);
        engine.subscribe(Box::new(move |change: &RelayChange| {
            if let Some(toggle) = change.toggle {
                if let Some(shown) = board.borrow_mut().get_mut(&toggle) {
                    *shown = change.energized;
                    debug!("{} shows {}", toggle, change.energized);
                }
            }
        }));

        Ok(Self {
            out,
            toggles,
            dwell,
        })
    }

    /// State `toggle` currently displays.
    pub fn toggle_state(&self, toggle: ToggleId) -> Option<bool> {
        self.toggles.borrow().get(&toggle).copied()
    }

    /// Output sink.
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Parse and execute one input line. Blank lines are ignored.
    pub fn handle_line(&mut self, engine: &mut ConfigurationEngine, line: &str) -> io::Result<Flow> {
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }
        match line.parse::<Command>() {
            Ok(cmd) => self.execute(engine, cmd),
            Err(e) => {
                writeln!(self.out, "error: {e}")?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Execute one command. Engine errors are reported on the output, not
    /// returned; only output failures end the console.
    pub fn execute(&mut self, engine: &mut ConfigurationEngine, cmd: Command) -> io::Result<Flow> {
        let result = match cmd {
            Command::List => return self.print_list(engine).map(|()| Flow::Continue),
            Command::Status => return self.print_status(engine).map(|()| Flow::Continue),
            Command::Help => {
                writeln!(self.out, "{HELP}")?;
                return Ok(Flow::Continue);
            }
            Command::Quit => return Ok(Flow::Quit),
            Command::Activate(name) => self.activate(engine, &name),
            Command::Preamp { relay, on } => self.preamp(engine, relay, on),
            Command::Identify => {
                let dwell = self.dwell;
                engine.identify(|relay, state| {
                    info!("Identify: {} -> {}", relay.label(), relay.position_name(state));
                    std::thread::sleep(dwell);
                })
            }
        };

        match result {
            Ok(()) => self.print_status(engine)?,
            Err(e) => {
                warn!("Command failed: {}", e);
                writeln!(self.out, "error: {e}")?;
            }
        }
        Ok(Flow::Continue)
    }

    fn activate(&mut self, engine: &mut ConfigurationEngine, name: &str) -> Result<(), EngineError> {
        let listed = engine.list_configurations();
        match name.parse::<usize>() {
            Ok(n) if (1..=listed.len()).contains(&n) => engine.activate(listed[n - 1].0),
            Ok(_) => Err(EngineError::UnknownConfiguration(name.to_string())),
            Err(_) => engine.activate_named(name),
        }
    }

    fn preamp(
        &mut self,
        engine: &mut ConfigurationEngine,
        relay: RelayId,
        on: bool,
    ) -> Result<(), EngineError> {
        let toggle = engine.binding(relay).map(|b| b.toggle());

        // The operator flipped the toggle; it shows the new state before
        // the relay is driven and falls back if the write fails.
        if let Some(toggle) = toggle {
            self.toggles.borrow_mut().insert(toggle, on);
        }
        let result = engine.set_override(relay, on);
        if result.is_err() {
            if let Some(toggle) = toggle {
                self.toggles
                    .borrow_mut()
                    .insert(toggle, engine.relay_state(relay));
            }
        }
        result
    }

    fn print_list(&mut self, engine: &ConfigurationEngine) -> io::Result<()> {
        let active = engine.active_configuration();
        for (n, (id, label)) in engine.list_configurations().into_iter().enumerate() {
            let marker = if id == active { '*' } else { ' ' };
            writeln!(self.out, "{marker} {}. {label:<16} ({})", n + 1, id.key())?;
        }
        Ok(())
    }

    fn print_status(&mut self, engine: &ConfigurationEngine) -> io::Result<()> {
        let diverged = engine.diverged_relays();
        writeln!(self.out, "Configuration: {}", engine.active_configuration())?;
        for relay in RelayId::ALL {
            let state = engine.relay_state(relay);
            let note = if diverged.contains(&relay) { " (override)" } else { "" };
            writeln!(
                self.out,
                "  {:<16} {:<9} {}{}",
                relay.label(),
                relay.position_name(state),
                engine.pin(relay),
                note
            )?;
        }

        let check = |toggle| match self.toggle_state(toggle) {
            Some(true) => "[x]",
            _ => "[ ]",
        };
        let (p70, p2m) = (check(TOGGLE_PREAMP_70CM), check(TOGGLE_PREAMP_2M));
        writeln!(self.out, "Preamp override: {p70} 70cm  {p2m} 2m")
    }
}
