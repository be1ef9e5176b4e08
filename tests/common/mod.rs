#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ftpjail::client::Session;
use ftpjail::config::{ServerConfig, StorageModeKind};
use ftpjail::protocol::{CommandResult, Dispatcher, standard_registry};
use ftpjail::server::ServerContext;
use ftpjail::storage::{MountedTree, TreeProvider};
use tempfile::TempDir;

pub const TREE_URI: &str = "content://tree/primary:Download";

pub fn test_config(root: &Path) -> ServerConfig {
    let mut users = HashMap::new();
    users.insert("alice".to_string(), "secret".to_string());
    ServerConfig {
        server_root: root.to_string_lossy().to_string(),
        allow_anonymous: true,
        users,
        ..ServerConfig::default()
    }
}

/// A jail on disk plus everything needed to dispatch commands into it.
pub struct Fixture {
    _dir: TempDir,
    pub root: PathBuf,
    /// Directory the tree is mounted at; equals `root` in direct mode.
    pub storage: PathBuf,
    pub context: Arc<ServerContext>,
    pub dispatcher: Dispatcher,
}

impl Fixture {
    pub fn direct() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap().join("jail");
        fs::create_dir_all(&root).unwrap();

        let context = Arc::new(ServerContext::new(test_config(&root)));
        Self::build(dir, root.clone(), root, context)
    }

    /// Tree mode with the tree mounted a few levels below the jail root, so
    /// the storage path has segments the client never sees.
    pub fn tree() -> Self {
        Self::tree_with_uri(TREE_URI)
    }

    pub fn tree_with_uri(uri: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap().join("jail");
        let mount = root.join("storage/emulated/0/Download");
        fs::create_dir_all(&mount).unwrap();

        let mut config = test_config(&root);
        config.storage_mode = StorageModeKind::Tree;
        config.tree_uri = uri.to_string();
        config.tree_mount = mount.to_string_lossy().to_string();

        let context = Arc::new(ServerContext::new(config));
        Self::build(dir, root, mount, context)
    }

    fn build(dir: TempDir, root: PathBuf, storage: PathBuf, context: Arc<ServerContext>) -> Self {
        let registry = standard_registry().unwrap();
        Self {
            _dir: dir,
            root,
            storage,
            context,
            dispatcher: Dispatcher::new(Arc::new(registry)),
        }
    }

    pub fn session(&self) -> Session {
        Session::new(Arc::clone(&self.context), Some("127.0.0.1:40000".parse().unwrap()))
    }

    pub fn login(&self) -> Session {
        let mut session = self.session();
        assert!(self.run(&mut session, "USER alice").message.starts_with("331"));
        assert!(self.run(&mut session, "PASS secret").message.starts_with("230"));
        session
    }

    pub fn guest(&self) -> Session {
        let mut session = self.session();
        assert!(self.run(&mut session, "USER anonymous").message.starts_with("331"));
        assert!(self.run(&mut session, "PASS guest@example.com").message.starts_with("230"));
        session
    }

    pub fn run(&self, session: &mut Session, line: &str) -> CommandResult {
        self.dispatcher.dispatch(session, &format!("{}\r\n", line))
    }

    /// Runs `line` and returns only the reply code.
    pub fn code(&self, session: &mut Session, line: &str) -> u16 {
        self.run(session, line).code().unwrap()
    }
}

/// `MountedTree` whose URI is empty and so never hands out a root handle.
pub fn unresolvable_tree(root: &Path) -> Arc<dyn TreeProvider> {
    Arc::new(MountedTree::new("", root.join("missing")))
}
