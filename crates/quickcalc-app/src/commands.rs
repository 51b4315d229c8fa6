//! Line parsing for the keypad front end.
//!
//! A line is either a run of keypad characters (`12+3=`) or a `:command`.

use quickcalc_calc::{Key, QuickCalcKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Keypad presses, applied in order
    Keys(Vec<Key>),
    /// Open a quick-calculation dialog and fill its fields in order
    Quick {
        kind: QuickCalcKind,
        args: Vec<String>,
    },
    /// Close the quick-calculation dialog
    Cancel,
    /// Search weather for a city
    Weather(String),
    Help,
    Quit,
    /// Nothing to do (blank line)
    Empty,
    /// Unrecognized input, with the offending text
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }

        if let Some(rest) = line.strip_prefix(':') {
            return Self::parse_command(rest);
        }

        let mut keys = Vec::new();
        for c in line.chars().filter(|c| !c.is_whitespace()) {
            match Key::from_char(c) {
                Some(key) => keys.push(key),
                None => return Command::Unknown(c.to_string()),
            }
        }
        Command::Keys(keys)
    }

    fn parse_command(rest: &str) -> Self {
        let mut parts = rest.split_whitespace();
        let Some(name) = parts.next() else {
            return Command::Unknown(":".to_string());
        };
        let args: Vec<String> = parts.map(str::to_string).collect();

        let kind = match name.to_ascii_lowercase().as_str() {
            "tip" => QuickCalcKind::Tip,
            "interest" => QuickCalcKind::Interest,
            "bmi" => QuickCalcKind::Bmi,
            "heat" | "heatindex" => QuickCalcKind::HeatIndex,
            "cancel" => return Command::Cancel,
            "weather" | "w" => return Command::Weather(args.join(" ")),
            "help" | "h" | "?" => return Command::Help,
            "quit" | "q" | "exit" => return Command::Quit,
            _ => return Command::Unknown(format!(":{}", name)),
        };

        Command::Quick { kind, args }
    }
}

pub const HELP: &str = "\
Keys:     0-9  + - * /  .  =  c (clear)   e.g. 12+3=
Commands: :tip <amount> <percent>
          :interest <principal> <rate> <years>
          :bmi <weight kg> <height cm>
          :heat <temp °F> <humidity %>
          :cancel             close an open quick-calc dialog
          :weather <city>     look up current weather
          :help  :quit";

#[cfg(test)]
mod tests {
    use super::*;
    use quickcalc_calc::{Digit, Operator};

    #[test]
    fn parses_keypad_run() {
        let cmd = Command::parse("1 + 2 =");
        let expected = vec![
            Key::Digit(Digit::new(1).unwrap()),
            Key::Operator(Operator::Add),
            Key::Digit(Digit::new(2).unwrap()),
            Key::Equals,
        ];
        assert_eq!(cmd, Command::Keys(expected));
    }

    #[test]
    fn rejects_unknown_key() {
        assert_eq!(Command::parse("12%"), Command::Unknown("%".to_string()));
    }

    #[test]
    fn parses_quick_commands() {
        assert_eq!(
            Command::parse(":tip 100 15"),
            Command::Quick {
                kind: QuickCalcKind::Tip,
                args: vec!["100".into(), "15".into()],
            }
        );
        assert!(matches!(
            Command::parse(":HEAT 90 85"),
            Command::Quick { kind: QuickCalcKind::HeatIndex, .. }
        ));
    }

    #[test]
    fn parses_weather_with_spaces() {
        assert_eq!(
            Command::parse(":weather San Francisco"),
            Command::Weather("San Francisco".to_string())
        );
    }

    #[test]
    fn parses_control_commands() {
        assert_eq!(Command::parse(":cancel"), Command::Cancel);
        assert_eq!(Command::parse(":q"), Command::Quit);
        assert_eq!(Command::parse(":help"), Command::Help);
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(Command::parse(":bogus"), Command::Unknown(":bogus".to_string()));
    }
}
