use catalog_core::{RecordId, ScrollMetrics};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    More,
    Scroll(ScrollMetrics),
    Search(String),
    Category(Option<String>),
    Company(Option<String>),
    Saved(Option<Vec<RecordId>>),
    Open(RecordId),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parses one input line; blank lines are `None`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "more" | "m" => Command::More,
        "scroll" => Command::Scroll(parse_scroll(rest)?),
        // An empty query is valid: it leaves search mode.
        "search" | "/" => Command::Search(rest.to_string()),
        "category" => Command::Category(optional(rest, "category <id|->")?),
        "company" => Command::Company(optional(rest, "company <id|->")?),
        "saved" => Command::Saved(
            optional(rest, "saved <id,id,...|->")?.map(|ids| {
                ids.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(RecordId::from)
                    .collect()
            }),
        ),
        "open" if !rest.is_empty() => Command::Open(RecordId::from(rest)),
        "open" => return Err(CommandError::Usage("open <id>")),
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// `-` clears the value.
fn optional(rest: &str, usage: &'static str) -> Result<Option<String>, CommandError> {
    match rest {
        "" => Err(CommandError::Usage(usage)),
        "-" => Ok(None),
        value => Ok(Some(value.to_string())),
    }
}

fn parse_scroll(rest: &str) -> Result<ScrollMetrics, CommandError> {
    const USAGE: &str = "scroll <top> <client-height> <scroll-height>";
    let numbers: Vec<u32> = rest
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()
        .map_err(|_| CommandError::Usage(USAGE))?;
    match numbers.as_slice() {
        [top, client, height] => Ok(ScrollMetrics::new(*top, *client, *height)),
        _ => Err(CommandError::Usage(USAGE)),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_context_commands() {
        assert_eq!(
            parse("category it").unwrap(),
            Some(Command::Category(Some("it".to_string())))
        );
        assert_eq!(parse("company -").unwrap(), Some(Command::Company(None)));
        assert_eq!(
            parse("saved b, a ,").unwrap(),
            Some(Command::Saved(Some(vec!["b".into(), "a".into()])))
        );
        assert_eq!(
            parse("  search   senior rust ").unwrap(),
            Some(Command::Search("senior rust".to_string()))
        );
        assert_eq!(parse("search").unwrap(), Some(Command::Search(String::new())));
    }

    #[test]
    fn parses_scroll_metrics() {
        assert_eq!(
            parse("scroll 850 100 1050").unwrap(),
            Some(Command::Scroll(ScrollMetrics::new(850, 100, 1050)))
        );
        assert_eq!(
            parse("scroll 850 100"),
            Err(CommandError::Usage("scroll <top> <client-height> <scroll-height>"))
        );
        assert!(parse("scroll a b c").is_err());
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse("   ").unwrap(), None);
        assert_eq!(parse("Q").unwrap(), Some(Command::Quit));
        assert_eq!(
            parse("refresh now"),
            Err(CommandError::Unknown("refresh".to_string()))
        );
        assert_eq!(parse("open"), Err(CommandError::Usage("open <id>")));
        assert_eq!(parse("category"), Err(CommandError::Usage("category <id|->")));
    }
}
