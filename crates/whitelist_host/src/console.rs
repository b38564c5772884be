//! Line protocol of the host console.
//!
//! Each stdin line is one host event:
//!
//! ```text
//! connect <identity>
//! disconnect <identity>
//! map <name>
//! console <command> [args...]
//! player <identity> <command> [args...]
//! status
//! quit
//! ```

use plugin_whitelist::Identity;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Connect(Identity),
    Disconnect(Identity),
    MapLoad(String),
    ConsoleCommand { name: String, args: String },
    PlayerCommand { player: Identity, name: String, args: String },
    Status,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty line")]
    Empty,
    #[error("unknown event `{0}`")]
    UnknownVerb(String),
    #[error("missing {0}")]
    MissingArgument(&'static str),
}

/// Split off the first whitespace-delimited word.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(end) => (&input[..end], input[end..].trim_start()),
        None => (input, ""),
    }
}

fn required<'a>(word: &'a str, what: &'static str) -> Result<&'a str, ParseError> {
    if word.is_empty() {
        Err(ParseError::MissingArgument(what))
    } else {
        Ok(word)
    }
}

impl HostEvent {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let (verb, rest) = split_word(line.trim());
        match verb {
            "" => Err(ParseError::Empty),
            "connect" => {
                let (id, _) = split_word(rest);
                Ok(HostEvent::Connect(Identity::from(required(id, "identity")?)))
            }
            "disconnect" => {
                let (id, _) = split_word(rest);
                Ok(HostEvent::Disconnect(Identity::from(required(id, "identity")?)))
            }
            "map" => {
                let (map, _) = split_word(rest);
                Ok(HostEvent::MapLoad(required(map, "map name")?.to_string()))
            }
            "console" => {
                let (name, args) = split_word(rest);
                Ok(HostEvent::ConsoleCommand {
                    name: required(name, "command name")?.to_string(),
                    args: args.to_string(),
                })
            }
            "player" => {
                let (id, rest) = split_word(rest);
                let player = Identity::from(required(id, "identity")?);
                let (name, args) = split_word(rest);
                Ok(HostEvent::PlayerCommand {
                    player,
                    name: required(name, "command name")?.to_string(),
                    args: args.to_string(),
                })
            }
            "status" => Ok(HostEvent::Status),
            "quit" | "exit" => Ok(HostEvent::Quit),
            other => Err(ParseError::UnknownVerb(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_connection_events() {
        assert_eq!(
            HostEvent::parse("connect 76500001"),
            Ok(HostEvent::Connect(Identity::from("76500001")))
        );
        assert_eq!(
            HostEvent::parse("  disconnect   76500001  "),
            Ok(HostEvent::Disconnect(Identity::from("76500001")))
        );
        assert_eq!(
            HostEvent::parse("connect"),
            Err(ParseError::MissingArgument("identity"))
        );
    }

    #[test]
    fn test_parse_map_load() {
        assert_eq!(
            HostEvent::parse("map de_dust2"),
            Ok(HostEvent::MapLoad("de_dust2".to_string()))
        );
    }

    #[test]
    fn test_parse_commands_keep_raw_args() {
        assert_eq!(
            HostEvent::parse("console wl 76500001"),
            Ok(HostEvent::ConsoleCommand {
                name: "wl".to_string(),
                args: "76500001".to_string(),
            })
        );
        assert_eq!(
            HostEvent::parse("console whitelist"),
            Ok(HostEvent::ConsoleCommand {
                name: "whitelist".to_string(),
                args: String::new(),
            })
        );
        assert_eq!(
            HostEvent::parse("player 7650 uwl 76500001 extra"),
            Ok(HostEvent::PlayerCommand {
                player: Identity::from("7650"),
                name: "uwl".to_string(),
                args: "76500001 extra".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(HostEvent::parse("   "), Err(ParseError::Empty));
        assert_eq!(
            HostEvent::parse("teleport x"),
            Err(ParseError::UnknownVerb("teleport".to_string()))
        );
        assert_eq!(
            HostEvent::parse("player 7650"),
            Err(ParseError::MissingArgument("command name"))
        );
    }

    #[test]
    fn test_parse_error_messages() {
        assert_eq!(ParseError::Empty.to_string(), "empty line");
        assert_eq!(
            ParseError::UnknownVerb("teleport".to_string()).to_string(),
            "unknown event `teleport`"
        );
        assert_eq!(
            ParseError::MissingArgument("identity").to_string(),
            "missing identity"
        );

        let err: Box<dyn std::error::Error> = Box::new(ParseError::Empty);
        assert!(err.source().is_none());
    }
}
