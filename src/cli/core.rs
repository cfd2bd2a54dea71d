//! Core CLI dispatch and shell context helpers.

use std::io;

use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use strsim::levenshtein;

use crate::{
    config::{Config, ConfigManager},
    core::{
        ledger_manager::LedgerManager,
        search::SearchQuery,
        services::{ServiceError, SummaryService, TransactionService},
        validation::TransactionDraft,
    },
    errors::LedgerError,
    storage::JsonStorage,
};

use super::format;
use super::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

pub type CommandResult = Result<(), CommandError>;

pub struct CommandEntry {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
}

pub const COMMANDS: &[CommandEntry] = &[
    CommandEntry {
        name: "add",
        usage: "add <description> <amount> <income|expense> <category> <YYYY-MM-DD>",
        description: "Record a transaction (prompts for fields when run without arguments)",
    },
    CommandEntry {
        name: "remove",
        usage: "remove <position>",
        description: "Delete the transaction shown at the given position",
    },
    CommandEntry {
        name: "list",
        usage: "list",
        description: "Show transactions, balance and analytics",
    },
    CommandEntry {
        name: "search",
        usage: "search <query>",
        description: "Filter by description, category or date text",
    },
    CommandEntry {
        name: "clear",
        usage: "clear",
        description: "Drop the active search filter",
    },
    CommandEntry {
        name: "balance",
        usage: "balance",
        description: "Show the running balance",
    },
    CommandEntry {
        name: "analytics",
        usage: "analytics",
        description: "Show spending analytics for the visible transactions",
    },
    CommandEntry {
        name: "backup",
        usage: "backup [note]",
        description: "Snapshot the ledger",
    },
    CommandEntry {
        name: "backups",
        usage: "backups",
        description: "List ledger snapshots, newest first",
    },
    CommandEntry {
        name: "restore",
        usage: "restore <backup>",
        description: "Replace the ledger with a snapshot",
    },
    CommandEntry {
        name: "config",
        usage: "config [key value]",
        description: "Show or change settings",
    },
    CommandEntry {
        name: "help",
        usage: "help [command]",
        description: "Show available commands",
    },
    CommandEntry {
        name: "version",
        usage: "version",
        description: "Show build information",
    },
    CommandEntry {
        name: "exit",
        usage: "exit",
        description: "Leave the shell",
    },
];

fn find_command(name: &str) -> Option<&'static CommandEntry> {
    COMMANDS.iter().find(|entry| entry.name == name)
}

/// State shared by every command: the managed ledger, settings, and the active search.
pub struct ShellContext {
    pub(crate) mode: CliMode,
    manager: LedgerManager,
    config: Config,
    config_manager: ConfigManager,
    query: Option<SearchQuery>,
    theme: ColorfulTheme,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        let storage = JsonStorage::new(None, Some(config.backup_retention))?;
        let manager = LedgerManager::open(Box::new(storage), &config.data_file)?;
        Ok(Self::with_parts(mode, manager, config, config_manager))
    }

    pub fn with_parts(
        mode: CliMode,
        manager: LedgerManager,
        config: Config,
        config_manager: ConfigManager,
    ) -> Self {
        Self {
            mode,
            manager,
            config,
            config_manager,
            query: None,
            theme: ColorfulTheme::default(),
        }
    }

    pub fn manager(&self) -> &LedgerManager {
        &self.manager
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn active_query(&self) -> Option<&SearchQuery> {
        self.query.as_ref()
    }

    pub(crate) fn prompt(&self) -> String {
        match &self.query {
            Some(query) => format!("spendlog [{}]> ", query.as_str()),
            None => "spendlog> ".to_string(),
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let result = match command {
            "add" => self.cmd_add(args),
            "remove" | "rm" => self.cmd_remove(args),
            "list" | "ls" => self.cmd_list(),
            "search" => self.cmd_search(args),
            "clear" => self.cmd_clear(),
            "balance" => self.cmd_balance(),
            "analytics" => self.cmd_analytics(),
            "backup" => self.cmd_backup(args),
            "backups" => self.cmd_backups(),
            "restore" => self.cmd_restore(args),
            "config" => self.cmd_config(args),
            "help" => self.cmd_help(args),
            "version" => self.cmd_version(),
            "exit" | "quit" => Err(CommandError::ExitRequested),
            _ => {
                self.suggest_command(raw);
                Ok(())
            }
        };
        match result {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = crate::cli::shell::parse_command_line(line)
            .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
        let Some(first) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        let command = first.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, first, &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = COMMANDS
            .iter()
            .map(|entry| (levenshtein(entry.name, &needle), entry.name))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{}`?", name));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt("Exit shell?")
            .default(true)
            .interact()?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Dialoguer(err) => Err(err.into()),
            other => {
                output::error(other);
                Ok(())
            }
        }
    }

    /// Recomputes everything derived from the ledger and prints it.
    fn render_view(&self) {
        let ledger = self.manager.ledger();
        let rows = match &self.query {
            Some(query) => TransactionService::search(&self.manager, query),
            None => TransactionService::list(&self.manager),
        };

        output::section("Transactions");
        if rows.is_empty() {
            output::info(if ledger.is_empty() {
                "No transactions recorded yet."
            } else {
                "No transactions match the current search."
            });
        }
        for (position, txn) in rows {
            let row = format::transaction_row(position, txn, &self.config);
            output::line(output::paint_kind(&row, txn.kind));
        }

        let summary = SummaryService::summarize(ledger, self.query.as_ref());
        for line in format::balance_lines(&summary, &self.config) {
            output::line(line);
        }
        output::section("Analytics");
        for line in format::analytics_lines(&summary.analytics, &self.config) {
            output::line(line);
        }
    }

    fn cmd_add(&mut self, args: &[&str]) -> CommandResult {
        let draft = match args {
            [description, amount, kind, category, date] => {
                TransactionDraft::new(*description, *amount, *kind, *category, *date)
            }
            [] if self.mode == CliMode::Interactive => self.prompt_draft()?,
            _ => return Err(usage_error("add")),
        };
        let position = TransactionService::add(&mut self.manager, &draft)?;
        output::success(format!("Transaction recorded at position {}.", position));
        self.render_view();
        Ok(())
    }

    fn prompt_draft(&self) -> Result<TransactionDraft, CommandError> {
        let description: String = Input::with_theme(&self.theme)
            .with_prompt("Description")
            .interact_text()?;
        let amount: String = Input::with_theme(&self.theme)
            .with_prompt("Amount")
            .interact_text()?;
        let kind: String = Input::with_theme(&self.theme)
            .with_prompt("Type (income/expense)")
            .default("expense".into())
            .interact_text()?;
        let category: String = Input::with_theme(&self.theme)
            .with_prompt("Category")
            .allow_empty(true)
            .interact_text()?;
        let date: String = Input::with_theme(&self.theme)
            .with_prompt("Date (YYYY-MM-DD)")
            .default(chrono::Local::now().date_naive().format("%Y-%m-%d").to_string())
            .interact_text()?;
        Ok(TransactionDraft::new(
            description,
            amount,
            kind,
            category,
            date,
        ))
    }

    fn cmd_remove(&mut self, args: &[&str]) -> CommandResult {
        let [raw] = args else {
            return Err(usage_error("remove"));
        };
        let position: usize = raw.parse().map_err(|_| {
            CommandError::InvalidArguments(format!("`{}` is not a valid position", raw))
        })?;
        if self.mode == CliMode::Interactive {
            if let Some(txn) = self.manager.ledger().get(position) {
                let confirmed = Confirm::with_theme(&self.theme)
                    .with_prompt(format!(
                        "Delete `{}` ({})?",
                        txn.description,
                        format::format_amount(txn.amount, &self.config)
                    ))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    output::info("Nothing removed.");
                    return Ok(());
                }
            }
        }
        let removed = TransactionService::remove(&mut self.manager, position)?;
        output::success(format!("Removed `{}`.", removed.description));
        self.render_view();
        Ok(())
    }

    fn cmd_list(&mut self) -> CommandResult {
        self.render_view();
        Ok(())
    }

    fn cmd_search(&mut self, args: &[&str]) -> CommandResult {
        if args.is_empty() {
            return Err(usage_error("search"));
        }
        self.query = Some(SearchQuery::new(args.join(" ")));
        self.render_view();
        Ok(())
    }

    fn cmd_clear(&mut self) -> CommandResult {
        self.query = None;
        self.render_view();
        Ok(())
    }

    fn cmd_balance(&mut self) -> CommandResult {
        let summary = SummaryService::summarize(self.manager.ledger(), self.query.as_ref());
        for line in format::balance_lines(&summary, &self.config) {
            output::line(line);
        }
        Ok(())
    }

    fn cmd_analytics(&mut self) -> CommandResult {
        let summary = SummaryService::summarize(self.manager.ledger(), self.query.as_ref());
        output::section("Analytics");
        for line in format::analytics_lines(&summary.analytics, &self.config) {
            output::line(line);
        }
        Ok(())
    }

    fn cmd_backup(&mut self, args: &[&str]) -> CommandResult {
        let note = args.join(" ");
        let note = Some(note.as_str()).filter(|note| !note.trim().is_empty());
        let name = self.manager.backup(note)?;
        output::success(format!("Backup `{}` created.", name));
        Ok(())
    }

    fn cmd_backups(&mut self) -> CommandResult {
        let backups = self.manager.list_backups()?;
        if backups.is_empty() {
            output::info("No backups yet.");
        }
        for name in backups {
            output::line(format!("  {}", name));
        }
        Ok(())
    }

    fn cmd_restore(&mut self, args: &[&str]) -> CommandResult {
        let [backup] = args else {
            return Err(usage_error("restore"));
        };
        let restored = self.manager.restore(backup)?.len();
        output::success(format!(
            "Restored `{}` ({} transactions).",
            backup, restored
        ));
        self.render_view();
        Ok(())
    }

    fn cmd_config(&mut self, args: &[&str]) -> CommandResult {
        match args {
            [] => {
                for key in Config::KEYS {
                    let value = self.config.get(key).unwrap_or_default();
                    output::line(format!("  {} = {}", key, value));
                }
                Ok(())
            }
            [key, value @ ..] if !value.is_empty() => {
                let mut updated = self.config.clone();
                updated.set(key, &value.join(" "))?;
                self.config_manager.save(&updated)?;
                self.config = updated;
                output::success(format!("Updated `{}`.", key));
                if matches!(*key, "data_file" | "backup_retention") {
                    output::info("The change takes effect the next time the shell starts.");
                }
                Ok(())
            }
            _ => Err(usage_error("config")),
        }
    }

    fn cmd_help(&mut self, args: &[&str]) -> CommandResult {
        match args.first() {
            Some(name) => {
                let entry = find_command(&name.to_lowercase()).ok_or_else(|| {
                    CommandError::InvalidArguments(format!("No help for `{}`.", name))
                })?;
                output::section(format!("Help: {}", entry.name));
                output::line(format!("  Description: {}", entry.description));
                output::line(format!("  Usage: {}", entry.usage));
            }
            None => {
                output::section("Available commands");
                for entry in COMMANDS {
                    output::line(format!("  {:<10} {}", entry.name, entry.description));
                }
                output::info("Use `help <command>` for details.");
            }
        }
        Ok(())
    }

    fn cmd_version(&mut self) -> CommandResult {
        output::line(format!(
            "spendlog {} ({} {}, built {})",
            env!("CARGO_PKG_VERSION"),
            env!("SPENDLOG_BUILD_HASH"),
            env!("SPENDLOG_BUILD_PROFILE"),
            env!("SPENDLOG_BUILD_TIMESTAMP"),
        ));
        Ok(())
    }
}

fn usage_error(command: &str) -> CommandError {
    let usage = find_command(command)
        .map(|entry| entry.usage)
        .unwrap_or(command);
    CommandError::InvalidArguments(format!("Usage: {}", usage))
}
