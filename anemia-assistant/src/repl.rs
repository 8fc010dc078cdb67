//! Line commands for the interactive stepper.

use anemia_core::{Field, FieldEdit, Stage};

use crate::error::{AssistantError, Result};

pub const HELP: &str = "\
Commands:
  set <field> <value>   edit a field and re-evaluate the active stage
  unset <field>         clear a field and re-evaluate
  eval                  re-evaluate the active stage
  back                  return to the previous stage
  goto <stage>          jump to screening | iron_status | workup | therapy_selection
  show                  print the last recommendation
  snapshot              print the patient snapshot as JSON
  fields                list editable fields
  help                  this text
  quit                  leave";

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Edit(FieldEdit),
    Evaluate,
    Back,
    GoTo(Stage),
    Show,
    Snapshot,
    Fields,
    Help,
    Quit,
}

/// Parse one input line; blank lines and `#` comments yield `None`
pub fn parse_line(line: &str) -> Result<Option<ReplCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default().to_ascii_lowercase();
    let args: Vec<&str> = words.collect();

    let command = match (verb.as_str(), args.as_slice()) {
        ("set", [field, value]) => ReplCommand::Edit(FieldEdit::parse(field, value)?),
        ("unset", [field]) => ReplCommand::Edit(FieldEdit::unset(field.parse::<Field>()?)),
        ("eval", []) => ReplCommand::Evaluate,
        ("back", []) => ReplCommand::Back,
        ("goto", [stage]) => ReplCommand::GoTo(stage.parse()?),
        ("show", []) => ReplCommand::Show,
        ("snapshot", []) => ReplCommand::Snapshot,
        ("fields", []) => ReplCommand::Fields,
        ("help", []) => ReplCommand::Help,
        ("quit" | "exit", []) => ReplCommand::Quit,
        _ => return Err(AssistantError::InvalidCommand(line.to_string())),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anemia_core::{Finding, LabField, ParseEditError};

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_line("set hemoglobin 9.4").unwrap(),
            Some(ReplCommand::Edit(FieldEdit::Lab(LabField::Hemoglobin, Some(9.4))))
        );
        assert_eq!(
            parse_line("  unset liver ").unwrap(),
            Some(ReplCommand::Edit(FieldEdit::Finding(Finding::Liver, false)))
        );
        assert_eq!(
            parse_line("goto therapy").unwrap(),
            Some(ReplCommand::GoTo(Stage::TherapySelection))
        );
        assert_eq!(parse_line("QUIT").unwrap(), Some(ReplCommand::Quit));
        assert_eq!(parse_line("# comment").unwrap(), None);
        assert_eq!(parse_line("").unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_line("set hemoglobin"),
            Err(AssistantError::InvalidCommand(_))
        ));
        assert!(matches!(
            parse_line("set albumin 3.5"),
            Err(AssistantError::Edit(ParseEditError::UnknownField(_)))
        ));
        assert!(matches!(
            parse_line("goto dialysis"),
            Err(AssistantError::Edit(ParseEditError::UnknownStage(_)))
        ));
    }
}
