//! UI utilities for terminal output
//!
//! This module provides the interactive console used by authentication
//! menus, numbered menu handling and progress spinners.

mod console;
mod menu;
mod spinner;

pub use console::{terminal_console, Console, LineConsole, TerminalConsole};
pub use menu::{choose, parse_selection};
pub use spinner::{create_spinner, finish_spinner};
