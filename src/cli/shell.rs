use std::{
    borrow::Cow,
    io::{self, BufRead, Lines, StdinLock},
};

use colored::Colorize;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Context as ReadlineContext, Editor, Helper,
};

use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext, COMMANDS};
use crate::cli::output::{self, OutputPreferences};
use crate::config::Config;

const SCRIPT_ENV: &str = "SPENDLOG_CLI_SCRIPT";
const TRANSACTION_KINDS: [&str; 2] = ["expense", "income"];

/// Runs the shell, reading commands from stdin when `SPENDLOG_CLI_SCRIPT` is set.
pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    output::set_preferences(OutputPreferences {
        plain_mode: mode == CliMode::Script,
        quiet_mode: false,
    });

    let mut context = ShellContext::new(mode)?;
    let mut input = match mode {
        CliMode::Interactive => {
            let mut editor = Editor::<LedgerHelper, DefaultHistory>::new()?;
            editor.set_helper(Some(LedgerHelper::default()));
            CommandInput::Editor(Box::new(editor))
        }
        CliMode::Script => CommandInput::Script(io::stdin().lock().lines()),
    };

    while let Some(line) = input.next_line(&context)? {
        match handle_line(&mut context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

/// Source of command lines: the line editor, or stdin in script mode.
enum CommandInput {
    Editor(Box<Editor<LedgerHelper, DefaultHistory>>),
    Script(Lines<StdinLock<'static>>),
}

impl CommandInput {
    /// Returns `None` once the user or the script is done.
    fn next_line(&mut self, context: &ShellContext) -> Result<Option<String>, CliError> {
        let editor = match self {
            CommandInput::Script(lines) => return Ok(lines.next().transpose()?),
            CommandInput::Editor(editor) => editor,
        };
        if let Some(helper) = editor.helper_mut() {
            helper.backups = context.manager().list_backups().unwrap_or_default();
        }
        loop {
            match editor.readline(&context.prompt()) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        editor.add_history_entry(line.trim()).ok();
                    }
                    return Ok(Some(line));
                }
                Err(ReadlineError::Interrupted) => {
                    if context.confirm_exit()? {
                        return Ok(None);
                    }
                }
                Err(ReadlineError::Eof) => {
                    output::info("Exiting shell.");
                    return Ok(None);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let tokens = match parse_command_line(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(format!("Could not read `{}`: {}", line.trim(), err));
            return Ok(LoopControl::Continue);
        }
    };
    let Some(raw) = tokens.first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = tokens[1..].iter().map(String::as_str).collect();
    context.dispatch(&raw.to_lowercase(), raw, &args)
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, shell_words::ParseError> {
    shell_words::split(input)
}

/// Completion and usage hints for the interactive shell.
#[derive(Default)]
struct LedgerHelper {
    /// Refreshed before every prompt so `restore` completes current snapshots.
    backups: Vec<String>,
}

/// The word under the cursor: its argument index (0 is the command) and typed prefix.
fn current_word(prefix: &str) -> Option<(Vec<String>, usize, String)> {
    let tokens = parse_command_line(prefix).ok()?;
    if prefix.is_empty() || prefix.ends_with(char::is_whitespace) {
        let index = tokens.len();
        Some((tokens, index, String::new()))
    } else {
        let index = tokens.len().checked_sub(1)?;
        let needle = tokens[index].clone();
        Some((tokens, index, needle))
    }
}

impl LedgerHelper {
    fn candidates(&self, command: Option<&str>, index: usize) -> Vec<String> {
        let owned = |values: &[&str]| -> Vec<String> { values.iter().map(|v| v.to_string()).collect() };
        match (command, index) {
            (_, 0) => COMMANDS.iter().map(|entry| entry.name.to_string()).collect(),
            (Some("add"), 3) => owned(&TRANSACTION_KINDS),
            (Some("restore"), 1) => self.backups.clone(),
            (Some("config"), 1) => owned(&Config::KEYS),
            (Some("help"), 1) => COMMANDS.iter().map(|entry| entry.name.to_string()).collect(),
            _ => Vec::new(),
        }
    }
}

impl Helper for LedgerHelper {}

impl Completer for LedgerHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let Some((tokens, index, needle)) = current_word(&line[..pos]) else {
            return Ok((pos, Vec::new()));
        };
        let command = tokens.first().map(|name| name.to_ascii_lowercase());
        let lowered = needle.to_ascii_lowercase();
        let candidates = self
            .candidates(command.as_deref(), index)
            .into_iter()
            .filter(|candidate| candidate.to_ascii_lowercase().starts_with(&lowered))
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((pos.saturating_sub(needle.len()), candidates))
    }
}

impl Hinter for LedgerHelper {
    type Hint = String;

    /// Shows the arguments still missing for a known command, e.g. `add Lunch ` hints
    /// `<amount> <income|expense> <category> <YYYY-MM-DD>`.
    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<String> {
        if pos < line.len() || !line.ends_with(' ') {
            return None;
        }
        let (tokens, index, _) = current_word(line)?;
        let command = tokens.first()?.to_ascii_lowercase();
        let entry = COMMANDS.iter().find(|entry| entry.name == command)?;
        let remaining: Vec<&str> = entry.usage.split_whitespace().skip(index).collect();
        if remaining.is_empty() {
            None
        } else {
            Some(remaining.join(" "))
        }
    }
}

impl Highlighter for LedgerHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.dimmed().to_string())
    }
}

impl Validator for LedgerHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(helper: &LedgerHelper, line: &str) -> (usize, Vec<String>) {
        let history = DefaultHistory::new();
        let ctx = ReadlineContext::new(&history);
        let (start, pairs) = helper.complete(line, line.len(), &ctx).unwrap();
        (start, pairs.into_iter().map(|pair| pair.replacement).collect())
    }

    #[test]
    fn quoted_arguments_stay_together() {
        let tokens = parse_command_line("add \"Coffee beans\" 12 expense food 2024-01-02").unwrap();
        assert_eq!(
            tokens,
            ["add", "Coffee beans", "12", "expense", "food", "2024-01-02"]
        );
    }

    #[test]
    fn unbalanced_quotes_are_reported() {
        assert!(parse_command_line("search \"open").is_err());
    }

    #[test]
    fn completes_command_names() {
        let (start, names) = complete(&LedgerHelper::default(), "ba");
        assert_eq!(start, 0);
        assert_eq!(names, ["balance", "backup", "backups"]);
    }

    #[test]
    fn completes_kind_in_add_position() {
        let helper = LedgerHelper::default();
        let (start, kinds) = complete(&helper, "add \"Coffee beans\" 12 in");
        assert_eq!(kinds, ["income"]);
        assert_eq!(start, "add \"Coffee beans\" 12 ".len());
        let (_, kinds) = complete(&helper, "add Lunch 9 ");
        assert_eq!(kinds, ["expense", "income"]);
        assert!(complete(&helper, "add Lunch ").1.is_empty());
    }

    #[test]
    fn completes_backup_names_for_restore() {
        let helper = LedgerHelper {
            backups: vec![
                "transactions_20240301_101500_payday.json".into(),
                "auto/transactions_20240302_090000.json".into(),
            ],
        };
        let (start, names) = complete(&helper, "restore tr");
        assert_eq!(start, "restore ".len());
        assert_eq!(names, ["transactions_20240301_101500_payday.json"]);
        assert_eq!(complete(&helper, "restore ").1.len(), 2);
    }

    #[test]
    fn hints_remaining_arguments() {
        let helper = LedgerHelper::default();
        let history = DefaultHistory::new();
        let ctx = ReadlineContext::new(&history);
        let line = "add Lunch ";
        assert_eq!(
            helper.hint(line, line.len(), &ctx).as_deref(),
            Some("<amount> <income|expense> <category> <YYYY-MM-DD>")
        );
        assert_eq!(helper.hint("list ", 5, &ctx), None);
        assert_eq!(helper.hint("add", 3, &ctx), None);
    }
}
