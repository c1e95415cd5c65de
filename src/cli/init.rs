//! taskprio init command implementation
//!
//! Writes a default `.taskprio.toml` into the vault and keeps the lock
//! directory out of version control when the vault has a `.gitignore`.

use std::path::{Path, PathBuf};

use crate::config::{Config, VAULT_CONFIG_FILE};
use crate::error::{Error, Result};
use crate::lock::LOCK_DIR;
use crate::output::{emit, OutputOptions, Report};
use crate::vault::Vault;

/// Options for the init command
pub struct InitOptions {
    pub vault: Option<PathBuf>,
    pub force: bool,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct InitReport {
    vault: PathBuf,
    config: PathBuf,
    created: InitCreated,
    updated: InitUpdated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    config: bool,
    lock_dir: bool,
}

#[derive(serde::Serialize)]
struct InitUpdated {
    config: bool,
    gitignore: bool,
}

pub fn run(options: InitOptions) -> Result<()> {
    let root = match options.vault {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let vault = Vault::open(root)?;
    let root = vault.root().to_path_buf();

    let config_path = root.join(VAULT_CONFIG_FILE);
    let (created_config, overwrote_config) = ensure_config(&config_path, options.force)?;
    let created_lock_dir = ensure_dir(&root.join(LOCK_DIR))?;
    let updated_gitignore = ensure_gitignore(&root)?;

    let report = InitReport {
        vault: root,
        config: config_path,
        created: InitCreated {
            config: created_config,
            lock_dir: created_lock_dir,
        },
        updated: InitUpdated {
            config: overwrote_config,
            gitignore: updated_gitignore,
        },
    };

    emit(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "init",
        &report,
    )
}

impl Report for InitReport {
    fn render(&self) -> String {
        let mut created = Vec::new();
        if self.created.config {
            created.push(VAULT_CONFIG_FILE);
        }
        if self.created.lock_dir {
            created.push(LOCK_DIR);
        }
        let mut updated = Vec::new();
        if self.updated.config {
            updated.push(VAULT_CONFIG_FILE);
        }
        if self.updated.gitignore {
            updated.push(".gitignore");
        }

        let mut lines = Vec::new();
        if created.is_empty() && updated.is_empty() {
            lines.push(format!(
                "taskprio init: nothing to do in {}",
                self.vault.display()
            ));
        } else {
            lines.push(format!(
                "taskprio init: initialized vault {}",
                self.vault.display()
            ));
        }
        if !created.is_empty() {
            lines.push(format!("created: {}", created.join(", ")));
        }
        if !updated.is_empty() {
            lines.push(format!("updated: {}", updated.join(", ")));
        }
        if !self.created.config && !self.updated.config {
            lines.push(format!(
                "{VAULT_CONFIG_FILE} already exists; pass --force to reset it"
            ));
        }
        lines.join("\n")
    }
}

/// Returns `(created, overwritten)`.
fn ensure_config(config_path: &Path, force: bool) -> Result<(bool, bool)> {
    if config_path.exists() {
        if !config_path.is_file() {
            return Err(Error::OperationFailed(format!(
                "{VAULT_CONFIG_FILE} exists but is not a file: {}",
                config_path.display()
            )));
        }
        if !force {
            return Ok((false, false));
        }
        Config::default().save(config_path)?;
        return Ok((false, true));
    }

    Config::default().save(config_path)?;
    Ok((true, false))
}

/// Add `.taskprio/` to an existing `.gitignore`; never creates one.
fn ensure_gitignore(vault_root: &Path) -> Result<bool> {
    let path = vault_root.join(".gitignore");
    if !path.is_file() {
        return Ok(false);
    }

    let existing = std::fs::read_to_string(&path)?;
    if has_taskprio_ignore(&existing) {
        return Ok(false);
    }

    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(".taskprio/\n");
    std::fs::write(&path, updated)?;
    Ok(true)
}

fn has_taskprio_ignore(contents: &str) -> bool {
    contents.lines().any(|line| {
        let trimmed = line.trim().trim_start_matches('/');
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        trimmed == ".taskprio" || trimmed == ".taskprio/" || trimmed.starts_with(".taskprio/")
    })
}

fn ensure_dir(path: &Path) -> Result<bool> {
    if path.exists() {
        if !path.is_dir() {
            return Err(Error::OperationFailed(format!(
                "Expected directory at {}",
                path.display()
            )));
        }
        return Ok(false);
    }

    std::fs::create_dir_all(path)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_existing_ignore_entries() {
        assert!(has_taskprio_ignore("node_modules\n.taskprio/\n"));
        assert!(has_taskprio_ignore("/.taskprio"));
        assert!(has_taskprio_ignore(".taskprio/locks/"));
        assert!(!has_taskprio_ignore("# .taskprio/\n.obsidian/"));
        assert!(!has_taskprio_ignore(".taskprio.toml"));
    }

    fn report(created_config: bool, overwritten: bool) -> InitReport {
        InitReport {
            vault: PathBuf::from("/vault"),
            config: PathBuf::from("/vault").join(VAULT_CONFIG_FILE),
            created: InitCreated {
                config: created_config,
                lock_dir: created_config,
            },
            updated: InitUpdated {
                config: overwritten,
                gitignore: false,
            },
        }
    }

    #[test]
    fn renders_what_changed() {
        assert_eq!(
            report(true, false).render(),
            "taskprio init: initialized vault /vault\ncreated: .taskprio.toml, .taskprio/locks"
        );
        assert_eq!(
            report(false, true).render(),
            "taskprio init: initialized vault /vault\nupdated: .taskprio.toml"
        );
        assert_eq!(
            report(false, false).render(),
            "taskprio init: nothing to do in /vault\n.taskprio.toml already exists; pass --force to reset it"
        );
    }
}
