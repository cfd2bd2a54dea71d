use chrono::{DateTime, NaiveDateTime, Utc};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{ensure_dir, PathResolver},
    domain::Ledger,
    errors::LedgerError,
};

use super::{Result, StorageBackend};

const FILE_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;
const AUTO_BACKUP_DIR: &str = "auto";

/// Stores each ledger as a pretty-printed JSON array of transactions.
#[derive(Clone)]
pub struct JsonStorage {
    data_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let data_dir = PathResolver::data_dir_in(&app_root);
        let backups_dir = PathResolver::backup_dir_in(&app_root);
        ensure_dir(&data_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            data_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn ledger_path(&self, name: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", canonical_name(name), FILE_EXTENSION))
    }

    pub fn backup_path(&self, name: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(name).join(backup_name)
    }

    /// Reads a backup listed by `list_backups` without touching the live ledger.
    pub fn load_backup(&self, name: &str, backup_name: &str) -> Result<Ledger> {
        let path = self.backup_path(name, backup_name);
        if backup_name.contains("..") || !path.is_file() {
            return Err(LedgerError::Storage(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        load_ledger_from_path(&path)
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    /// Copies taken automatically before an overwrite. Only these are pruned.
    fn auto_backup_dir(&self, name: &str) -> PathBuf {
        self.backup_dir(name).join(AUTO_BACKUP_DIR)
    }

    fn write_backup_file(&self, ledger: &Ledger, name: &str, note: Option<&str>) -> Result<String> {
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let file_name = unique_backup_name(&dir, name, sanitize_backup_note(note).as_deref());
        let json = serde_json::to_string_pretty(ledger)?;
        write_atomic(&dir.join(&file_name), &json)?;
        Ok(file_name)
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.auto_backup_dir(name);
        ensure_dir(&dir)?;
        let file_name = unique_backup_name(&dir, name, None);
        fs::copy(path, dir.join(&file_name))?;
        self.prune_auto_backups(name)
    }

    fn prune_auto_backups(&self, name: &str) -> Result<()> {
        let dir = self.auto_backup_dir(name);
        let mut backups = backup_files_in(&dir)?;
        sort_newest_first(&mut backups);
        for entry in backups.iter().skip(self.retention) {
            let path = dir.join(entry);
            if let Err(err) = fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, ledger: &Ledger, name: &str) -> Result<()> {
        let path = self.ledger_path(name);
        self.backup_existing_file(name, &path)?;
        save_ledger_to_path(ledger, &path)?;
        tracing::debug!(path = %path.display(), transactions = ledger.len(), "ledger saved");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Ledger> {
        let path = self.ledger_path(name);
        if !path.exists() {
            tracing::info!(path = %path.display(), "no saved ledger, starting empty");
            return Ok(Ledger::new());
        }
        load_ledger_from_path(&path)
    }

    /// Named backups and automatic copies (prefixed `auto/`), newest first.
    fn list_backups(&self, name: &str) -> Result<Vec<String>> {
        let mut entries = backup_files_in(&self.backup_dir(name))?;
        entries.extend(
            backup_files_in(&self.auto_backup_dir(name))?
                .into_iter()
                .map(|file| format!("{}/{}", AUTO_BACKUP_DIR, file)),
        );
        sort_newest_first(&mut entries);
        Ok(entries)
    }

    fn backup(&self, ledger: &Ledger, name: &str, note: Option<&str>) -> Result<String> {
        self.write_backup_file(ledger, name, note)
    }

    fn restore(&self, name: &str, backup_name: &str) -> Result<Ledger> {
        let ledger = self.load_backup(name, backup_name)?;
        let target = self.ledger_path(name);
        self.backup_existing_file(name, &target)?;
        save_ledger_to_path(&ledger, &target)?;
        tracing::info!(backup = backup_name, "ledger restored from backup");
        Ok(ledger)
    }
}

fn backup_files_in(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
            continue;
        }
        if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
            entries.push(file_name.to_string());
        }
    }
    Ok(entries)
}

fn sort_newest_first(entries: &mut [String]) {
    entries.sort_by(|a, b| {
        parse_backup_timestamp(b)
            .cmp(&parse_backup_timestamp(a))
            .then_with(|| b.cmp(a))
    });
}

/// `<ledger>_<timestamp>[_<note>].json`, with a `_N` counter when that second is taken.
fn unique_backup_name(dir: &Path, name: &str, label: Option<&str>) -> String {
    let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
    let mut stem = format!("{}_{}", canonical_name(name), timestamp);
    if let Some(label) = label {
        stem.push('_');
        stem.push_str(label);
    }
    let mut file_name = format!("{}.{}", stem, FILE_EXTENSION);
    let mut sequence = 1;
    while dir.join(&file_name).exists() {
        sequence += 1;
        file_name = format!("{}_{}.{}", stem, sequence, FILE_EXTENSION);
    }
    file_name
}

pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(ledger)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_ledger_from_path(path: &Path) -> Result<Ledger> {
    let data = fs::read_to_string(path)?;
    let ledger: Ledger = serde_json::from_str(&data)?;
    Ok(ledger)
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "transactions".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.')) && !sanitized.is_empty() && !last_dash {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Finds the `YYYYMMDD_HHMMSS` pair anywhere in a backup file name.
fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{}", FILE_EXTENSION))?;
    let parts: Vec<&str> = stem.split('_').collect();
    parts.windows(2).rev().find_map(|pair| {
        if !is_digits(pair[0], 8) || !is_digits(pair[1], 6) {
            return None;
        }
        let raw = format!("{}{}", pair[0], pair[1]);
        NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M%S")
            .ok()
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
    })
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
