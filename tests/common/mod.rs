#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use retrace::RetraceContext;
use retrace::tracking::TrackingRegistry;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Isolated watched directory plus a private config file location.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub dir: PathBuf,
    pub config_path: PathBuf,
}

impl TestEnv {
    /// Creates an empty watched directory; nothing is tracked yet.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let dir = temp_dir.path().join("watched");
        fs::create_dir_all(&dir)?;
        let config_path = temp_dir.path().join("config").join("retrace.toml");

        Ok(Self {
            temp_dir,
            dir,
            config_path,
        })
    }

    /// Creates the environment and initializes tracking in it.
    pub fn initialized() -> Result<(Self, TrackingRegistry)> {
        let env = Self::new()?;
        let registry = TrackingRegistry::initialize(&env.dir)?;
        Ok((env, registry))
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn read(&self, name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.path(name))?)
    }

    pub fn backup_slot(&self, name: &str) -> PathBuf {
        self.dir.join(".tracking").join(name)
    }

    pub fn registry_file(&self) -> PathBuf {
        self.dir.join(".tracking").join("tracking_files.json")
    }

    /// Opens and loads the registry as a fresh process would.
    pub fn reopen(&self) -> Result<TrackingRegistry> {
        let mut registry = TrackingRegistry::locate(&self.dir)?;
        registry.load()?;
        Ok(registry)
    }

    pub fn context(&self) -> Result<RetraceContext> {
        RetraceContext::new_explicit(self.dir.clone(), self.config_path.clone())
    }

    /// The binary, pointed at this environment's directory and config.
    pub fn cmd(&self) -> Result<Command> {
        let mut cmd = Command::cargo_bin("retrace")?;
        cmd.env("RETRACE_CONFIG_PATH", &self.config_path)
            .env("NO_COLOR", "1")
            .env_remove("RETRACE_DIR")
            .env_remove("RETRACE_LOG")
            .arg("-C")
            .arg(&self.dir);
        Ok(cmd)
    }
}

pub fn names(files: &[retrace::tracking::TrackedFile]) -> Vec<&str> {
    files.iter().map(|file| file.filename.as_str()).collect()
}

