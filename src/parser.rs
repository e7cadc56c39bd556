use crate::ast::*;
use crate::types::Command;
use winnow::combinator::{preceded, separated_pair};
use winnow::token::{rest, take_till, take_while};
use winnow::Parser;

pub const DEFAULT_INDENT_THRESHOLD: usize = 4;

pub fn parse(input: &str, indent_threshold: usize) -> Vec<Line> {
    let mut lines = Vec::new();

    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let mut raw = line;
        if idx == 0 {
            raw = raw.trim_start_matches('\u{feff}');
        }

        if raw.trim().is_empty() {
            continue;
        }

        lines.push(Line {
            kind: classify(raw, indent_threshold),
            text: strip_indent(raw).to_string(),
            line_no,
        });
    }

    lines
}

/// Decides the kind of a single line. Indentation wins over every other rule.
pub fn classify(line: &str, indent_threshold: usize) -> LineKind {
    let first = line.chars().next();
    let last = line.chars().next_back();

    if first == Some('\t') || leading_whitespace(line) >= indent_threshold {
        return LineKind::Choice;
    }
    if line.chars().count() > 1 && first == Some('[') && last == Some(']') {
        return LineKind::Tag;
    }
    if first == Some('@') {
        return LineKind::Command;
    }
    if last == Some(':') {
        return LineKind::CharacterId;
    }
    LineKind::DialogueLine
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Removes one leading tab, or else the whole run of leading whitespace.
pub fn strip_indent(line: &str) -> &str {
    match line.strip_prefix('\t') {
        Some(rest) => rest,
        None => line.trim_start(),
    }
}

// "@name" or "@name<whitespace>parameter"
fn command_parts<'s>(input: &mut &'s str) -> winnow::Result<(&'s str, &'s str)> {
    preceded(
        '@',
        separated_pair(
            take_till(0.., char::is_whitespace),
            take_while(0.., char::is_whitespace),
            rest,
        ),
    )
    .parse_next(input)
}

/// Parses a command line that still carries its leading `@`.
///
/// Without a space the whole remainder is the name and the parameter is
/// absent. A trailing space yields an empty, but present, parameter.
pub fn parse_command(line: &str) -> Option<Command> {
    let body = line.strip_prefix('@')?;
    if !line.contains(' ') {
        return Some(Command {
            name: body.to_string(),
            parameter: None,
        });
    }

    let mut input = line;
    let (name, parameter) = command_parts.parse_next(&mut input).ok()?;
    Some(Command {
        name: name.to_string(),
        parameter: Some(parameter.to_string()),
    })
}

/// Everything before the last colon of the line.
pub fn parse_character_id(line: &str) -> Option<String> {
    line.rfind(':').map(|idx| line[..idx].to_string())
}

/// Content between the most recent `[` and the first `]` that follows it.
pub fn parse_tag(line: &str) -> Option<String> {
    if line.chars().count() < 3 {
        return None;
    }

    let mut start = None;
    for (idx, ch) in line.char_indices() {
        match ch {
            '[' => start = Some(idx + 1),
            ']' => {
                if let Some(s) = start {
                    let content = &line[s..idx];
                    return (!content.is_empty()).then(|| content.to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(line: &str) -> LineKind {
        classify(line, DEFAULT_INDENT_THRESHOLD)
    }

    #[test]
    fn classifies_each_kind() {
        assert_eq!(kind("Alice:"), LineKind::CharacterId);
        assert_eq!(kind("Hello there."), LineKind::DialogueLine);
        assert_eq!(kind("@heal 10"), LineKind::Command);
        assert_eq!(kind("[intro]"), LineKind::Tag);
        assert_eq!(kind("\tGood, thanks!"), LineKind::Choice);
        assert_eq!(kind("    Good, thanks!"), LineKind::Choice);
        // trailing whitespace is significant
        assert_eq!(kind("Alice: "), LineKind::DialogueLine);
        assert_eq!(kind("[intro] "), LineKind::DialogueLine);
    }

    #[test]
    fn indentation_takes_priority() {
        assert_eq!(kind("\t[good_reply]"), LineKind::Choice);
        assert_eq!(kind("    @heal"), LineKind::Choice);
        assert_eq!(kind("     Bob:"), LineKind::Choice);
        // below the threshold the other rules apply to the raw line
        assert_eq!(kind("   [tag]"), LineKind::DialogueLine);
        assert_eq!(kind("  @cmd"), LineKind::DialogueLine);
        assert_eq!(kind("  Bob:"), LineKind::CharacterId);
    }

    #[test]
    fn threshold_is_configurable() {
        assert_eq!(classify("  choice", 2), LineKind::Choice);
        assert_eq!(classify("   choice", 8), LineKind::DialogueLine);
    }

    #[test]
    fn tag_needs_two_characters() {
        assert_eq!(kind("[]"), LineKind::Tag);
        assert_eq!(kind("["), LineKind::DialogueLine);
        assert_eq!(kind("]"), LineKind::DialogueLine);
        assert_eq!(kind("[tag] trailing"), LineKind::DialogueLine);
    }

    #[test]
    fn tag_checked_before_command_and_character() {
        assert_eq!(kind("[a:]"), LineKind::Tag);
        assert_eq!(kind("@say:"), LineKind::Command);
        assert_eq!(kind("@"), LineKind::Command);
        assert_eq!(kind(":"), LineKind::CharacterId);
    }

    #[test]
    fn strips_one_tab_or_whitespace_run() {
        assert_eq!(strip_indent("\tGood"), "Good");
        assert_eq!(strip_indent("\t\tNested"), "\tNested");
        assert_eq!(strip_indent("    Good"), "Good");
        assert_eq!(strip_indent("  \t Mixed"), "Mixed");
        assert_eq!(strip_indent("Plain"), "Plain");
    }

    #[test]
    fn parse_skips_blank_lines_and_keeps_line_numbers() {
        let lines = parse("\u{feff}[start]\n\n   \nAlice:\r\n\tHi\n", 4);
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            Line {
                kind: LineKind::Tag,
                text: "[start]".to_string(),
                line_no: 1,
            }
        );
        assert_eq!(lines[1].kind, LineKind::CharacterId);
        assert_eq!(lines[1].text, "Alice:");
        assert_eq!(lines[1].line_no, 4);
        assert_eq!(lines[2].kind, LineKind::Choice);
        assert_eq!(lines[2].text, "Hi");
    }

    #[test]
    fn only_blank_input_yields_no_lines() {
        assert!(parse("", 4).is_empty());
        assert!(parse("\n\n \t\n    \n", 4).is_empty());
    }

    #[test]
    fn command_with_and_without_parameter() {
        let cmd = parse_command("@heal 10").unwrap();
        assert_eq!(cmd.name, "heal");
        assert_eq!(cmd.parameter.as_deref(), Some("10"));

        let cmd = parse_command("@heal").unwrap();
        assert_eq!(cmd.name, "heal");
        assert_eq!(cmd.parameter, None);
    }

    #[test]
    fn command_parameter_follows_whitespace_run() {
        let cmd = parse_command("@play   theme  loud").unwrap();
        assert_eq!(cmd.name, "play");
        assert_eq!(cmd.parameter.as_deref(), Some("theme  loud"));

        let cmd = parse_command("@wait ").unwrap();
        assert_eq!(cmd.name, "wait");
        assert_eq!(cmd.parameter.as_deref(), Some(""));

        // only a literal space switches to the split form
        let cmd = parse_command("@wait\t5").unwrap();
        assert_eq!(cmd.name, "wait\t5");
        assert_eq!(cmd.parameter, None);

        assert!(parse_command("heal 10").is_none());
    }

    #[test]
    fn character_id_cuts_at_last_colon() {
        assert_eq!(parse_character_id("Alice:").as_deref(), Some("Alice"));
        assert_eq!(
            parse_character_id("Dr. Who: the Doctor:").as_deref(),
            Some("Dr. Who: the Doctor")
        );
        assert_eq!(parse_character_id("no colon"), None);
    }

    #[test]
    fn tag_content() {
        assert_eq!(parse_tag("[intro]").as_deref(), Some("intro"));
        assert_eq!(parse_tag("[[inner]").as_deref(), Some("inner"));
        assert_eq!(parse_tag("[a][b]").as_deref(), Some("a"));
        assert_eq!(parse_tag("x]y[z]").as_deref(), Some("z"));
        assert_eq!(parse_tag("[]"), None);
        assert_eq!(parse_tag("[]]"), None);
        assert_eq!(parse_tag("[open"), None);
    }
}
