use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use work_rename::catalog::{CatalogClient, CatalogCredentials, ContentId, Endpoints};
use work_rename::print_warning;
use work_rename::walk::{self, FileCandidate, WalkDepth};

use crate::config::Config;

/// A matched archive and the name resolved for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameItem {
    pub path: PathBuf,
    pub new_name: String,
    pub renamed: bool,
}

/// Looks up archive metadata and renames the archives.
#[derive(Debug)]
pub struct WorkRename {
    client: CatalogClient,
    config: Config,
    credentials: CatalogCredentials,
}

impl WorkRename {
    /// Create a new instance using the real catalog endpoints.
    ///
    /// # Errors
    /// Returns an error if the settings file cannot be read or parsed.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_endpoints(config, Endpoints::default())
    }

    /// Create a new instance using the given catalog endpoints.
    ///
    /// # Errors
    /// Returns an error if the settings file cannot be read or parsed,
    /// or the HTTP client cannot be created.
    pub fn with_endpoints(config: Config, endpoints: Endpoints) -> Result<Self> {
        let credentials = CatalogCredentials::from_file(&config.settings_path)?;
        let client = CatalogClient::new(endpoints, config.verbose)?;
        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    /// Run renaming for all input paths.
    ///
    /// # Errors
    /// Returns an error on the first failed walk, lookup, or rename.
    pub async fn run(&self) -> Result<()> {
        if self.config.verbose {
            println!("{}", self.config);
        }

        let items = self.rename_paths().await?;
        let count = items.iter().filter(|item| item.renamed).count();
        let message = format!("{count} {}", if count == 1 { "file" } else { "files" });

        if !self.config.execute {
            let count = items.len();
            println!(
                "Dryrun: would have renamed {count} {}",
                if count == 1 { "file" } else { "files" }
            );
        } else if count > 0 {
            println!("{}", format!("Renamed {message}").green());
        }
        Ok(())
    }

    /// Process every input path in order.
    ///
    /// Paths that do not exist are skipped.
    async fn rename_paths(&self) -> Result<Vec<RenameItem>> {
        let mut items = Vec::new();
        for path in &self.config.paths {
            let path = work_rename::clean_path(path);
            if !path.exists() {
                print_warning!("{} does not exist", path.display());
                continue;
            }
            items.extend(self.rename_path(&path).await?);
        }
        Ok(items)
    }

    /// Walk a single input path and handle each matching archive.
    async fn rename_path(&self, root: &Path) -> Result<Vec<RenameItem>> {
        let depth = WalkDepth::from_recurse(self.config.recurse);
        let mut items = Vec::new();
        for candidate in walk::walk(root, depth) {
            if let Some(item) = self.process_file(&candidate?).await? {
                items.push(item);
            }
        }
        Ok(items)
    }

    /// Look up and rename one file. Returns `None` for files that are not catalog archives.
    async fn process_file(&self, candidate: &FileCandidate) -> Result<Option<RenameItem>> {
        if candidate.is_dir {
            return Ok(None);
        }
        let Some(content_id) = ContentId::from_file_name(&candidate.name) else {
            if self.config.verbose {
                println!("{}", format!("Skipping {}", candidate.name).dimmed());
            }
            return Ok(None);
        };

        let work = self
            .client
            .lookup(&content_id, &self.credentials)
            .await
            .with_context(|| format!("Failed to look up {content_id} for {}", candidate.path.display()))?;
        if self.config.verbose {
            println!("{}", format!("{content_id}: {work}").dimmed());
        }

        let new_name = work.file_name();
        println!("{} -> {new_name}", candidate.path.display());

        let renamed = if self.config.execute {
            self.rename_file(&candidate.path, &new_name)?
        } else {
            false
        };

        Ok(Some(RenameItem {
            path: candidate.path.clone(),
            new_name,
            renamed,
        }))
    }

    /// Rename within the same directory. Returns false if the rename was skipped.
    fn rename_file(&self, path: &Path, new_name: &str) -> Result<bool> {
        let new_path = path.with_file_name(new_name);
        if new_path == path {
            return Ok(false);
        }
        if new_path.exists() && !self.config.overwrite {
            print_warning!("File already exists: {}", new_path.display());
            return Ok(false);
        }
        fs::rename(path, &new_path)
            .with_context(|| format!("Failed to rename {} to {}", path.display(), new_path.display()))?;
        Ok(true)
    }
}
