//! Player commands and their text form.
//!
//! Front ends speak in `PlayerCommand`s. The terminal front end types them as
//! short lines (`create Ash red`, `alloc flame-wheel`, `w`, `space`), and
//! `parse_line` also recognizes a few console-only verbs.

use bevy::ecs::prelude::Event;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::combat::Direction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Event)]
pub enum PlayerCommand {
    Create { name: String, class_id: String },
    Load(String),
    Delete(String),
    Allocate(String),
    SelectMap(String),
    /// Auto-resolve all encounters of the selected map
    RunMap,
    /// Enter the interactive arena for the selected map
    EnterMap,
    Move(Direction),
    Attack,
    CloseMap,
}

/// Console verbs that never reach the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleVerb {
    Help,
    Show,
    Quit,
    /// Balance simulation of the active character on the selected map
    Simulate(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Command(PlayerCommand),
    Console(ConsoleVerb),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{verb} needs {what}")]
    MissingArgument { verb: String, what: &'static str },
}

pub const HELP: &str = "\
commands:
  create <name> <red|blue|green>   new character
  load <id> | delete <id>          roster
  alloc <node-id>                  spend a tree point
  map <map-id>                     select a map
  run                              auto-resolve the selected map
  enter                            interactive arena
  w/a/s/d or up/down/left/right    move
  space | attack                   attack nearest enemy
  close                            leave the arena
  sim [trials]                     balance simulation on the selected map
  show | help | quit";

impl FromStr for Direction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "w" | "up" | "arrowup" => Ok(Self::Up),
            "s" | "down" | "arrowdown" => Ok(Self::Down),
            "a" | "left" | "arrowleft" => Ok(Self::Left),
            "d" | "right" | "arrowright" => Ok(Self::Right),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }
}

fn argument<'a>(
    rest: &mut impl Iterator<Item = &'a str>,
    verb: &str,
    what: &'static str,
) -> Result<String, ParseError> {
    rest.next()
        .map(str::to_string)
        .ok_or_else(|| ParseError::MissingArgument {
            verb: verb.to_string(),
            what,
        })
}

/// Parse one line of console input
pub fn parse_line(line: &str) -> Result<ConsoleInput, ParseError> {
    // a bare space is the attack key
    if line == " " {
        return Ok(ConsoleInput::Command(PlayerCommand::Attack));
    }
    let mut words = line.split_whitespace();
    let verb = words.next().ok_or(ParseError::Empty)?.to_ascii_lowercase();

    let command = match verb.as_str() {
        "help" | "?" => return Ok(ConsoleInput::Console(ConsoleVerb::Help)),
        "show" | "view" => return Ok(ConsoleInput::Console(ConsoleVerb::Show)),
        "quit" | "exit" | "q" => return Ok(ConsoleInput::Console(ConsoleVerb::Quit)),
        "sim" | "simulate" => {
            let trials = match words.next() {
                Some(n) => n.parse().map_err(|_| ParseError::Unknown(n.to_string()))?,
                None => 1_000,
            };
            return Ok(ConsoleInput::Console(ConsoleVerb::Simulate(trials)));
        }
        "create" | "new" => {
            // last word is the class, everything before it the name
            let rest: Vec<&str> = words.collect();
            match rest.split_last() {
                Some((class_id, name)) => PlayerCommand::Create {
                    name: name.join(" "),
                    class_id: class_id.to_ascii_lowercase(),
                },
                None => {
                    return Err(ParseError::MissingArgument {
                        verb: verb.clone(),
                        what: "a name and a class",
                    })
                }
            }
        }
        "load" => PlayerCommand::Load(argument(&mut words, &verb, "a character id")?),
        "delete" | "del" => PlayerCommand::Delete(argument(&mut words, &verb, "a character id")?),
        "alloc" | "allocate" => {
            PlayerCommand::Allocate(argument(&mut words, &verb, "a node id")?)
        }
        "map" | "select" => PlayerCommand::SelectMap(argument(&mut words, &verb, "a map id")?),
        "run" => PlayerCommand::RunMap,
        "enter" | "play" => PlayerCommand::EnterMap,
        "space" | "attack" | "x" => PlayerCommand::Attack,
        "close" | "leave" | "esc" => PlayerCommand::CloseMap,
        other => PlayerCommand::Move(other.parse()?),
    };
    Ok(ConsoleInput::Command(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> PlayerCommand {
        match parse_line(line).unwrap() {
            ConsoleInput::Command(c) => c,
            other => panic!("expected command, got {other:?}"),
        }
    }

    #[test]
    fn test_create_joins_name_words() {
        assert_eq!(
            command("create Ash of Embers RED"),
            PlayerCommand::Create {
                name: "Ash of Embers".into(),
                class_id: "red".into()
            }
        );
        // a single word is taken as the class with an empty name
        assert_eq!(
            command("create red"),
            PlayerCommand::Create {
                name: String::new(),
                class_id: "red".into()
            }
        );
    }

    #[test]
    fn test_movement_keys() {
        assert_eq!(command("w"), PlayerCommand::Move(Direction::Up));
        assert_eq!(command("ArrowLeft"), PlayerCommand::Move(Direction::Left));
        assert_eq!(command("down"), PlayerCommand::Move(Direction::Down));
        assert_eq!(command("D"), PlayerCommand::Move(Direction::Right));
        assert_eq!(command(" "), PlayerCommand::Attack);
        assert_eq!(command("space"), PlayerCommand::Attack);
    }

    #[test]
    fn test_arguments_required() {
        assert!(matches!(
            parse_line("alloc"),
            Err(ParseError::MissingArgument { .. })
        ));
        assert!(matches!(
            parse_line("create"),
            Err(ParseError::MissingArgument { .. })
        ));
        assert_eq!(
            command("alloc flame-wheel"),
            PlayerCommand::Allocate("flame-wheel".into())
        );
    }

    #[test]
    fn test_console_verbs_and_errors() {
        assert_eq!(
            parse_line("quit").unwrap(),
            ConsoleInput::Console(ConsoleVerb::Quit)
        );
        assert_eq!(
            parse_line("sim 250").unwrap(),
            ConsoleInput::Console(ConsoleVerb::Simulate(250))
        );
        assert_eq!(parse_line("").unwrap_err(), ParseError::Empty);
        assert_eq!(
            parse_line("dance").unwrap_err(),
            ParseError::Unknown("dance".into())
        );
    }
}
