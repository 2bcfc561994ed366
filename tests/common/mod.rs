use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

pub fn run_dubdesk(args: &[&str]) -> Output {
    TestEnv::new().run(args)
}

/// Isolated HOME/XDG directories so runs never see a real config file.
pub struct TestEnv {
    home: TempDir,
    config: TempDir,
    data: TempDir,
    api_url: Option<String>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temporary HOME dir"),
            config: tempfile::tempdir().expect("create temporary XDG config dir"),
            data: tempfile::tempdir().expect("create temporary XDG data dir"),
            api_url: None,
        }
    }

    /// Point the binary at a mock API server.
    #[allow(dead_code)]
    pub fn with_api(mut self, url: &str) -> Self {
        self.api_url = Some(url.to_string());
        self
    }

    pub fn run(&self, args: &[&str]) -> Output {
        let mut command = Command::new(env!("CARGO_BIN_EXE_dubdesk"));
        command
            .args(args)
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.config.path())
            .env("XDG_DATA_HOME", self.data.path())
            .env_remove("DUBDESK_API_URL")
            .env_remove("DUBDESK_OWNER_CODE")
            .env_remove("RUST_LOG");

        if let Some(url) = &self.api_url {
            command.env("DUBDESK_API_URL", url);
        }

        command.output().expect("failed to execute dubdesk binary")
    }

    #[allow(dead_code)]
    pub fn config_path(&self) -> PathBuf {
        let output = self.run(&["config", "path"]);
        assert!(
            output.status.success(),
            "config path should succeed\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );

        let path = String::from_utf8_lossy(&output.stdout);
        PathBuf::from(path.trim())
    }

    #[allow(dead_code)]
    pub fn write_config(&self, contents: &str) {
        let config_path = self.config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).expect("create config parent directory");
        }
        std::fs::write(&config_path, contents).expect("write config file");
    }
}
