use envplate::config::{parse_config, EnvConfig};
use envplate::error::Result;
use envplate::init::{create_env_directories, ensure_gitignore, init_project};
use envplate::runner::{CommandRunner, ToolCommand};
use envplate::workspace::Workspace;
use std::cell::RefCell;
use std::fs;
use tempfile::TempDir;

const DESCRIPTOR: &str = r#"
project: github.com/acme/shop
default:
  config_src: configs
  config_tgt: dist/configs
  configs: [api]
  binary_src: cmd
  binary_tgt: bin
  binaries: [api]
env:
  prod:
    config_src: prod/configs
  test:
    kubernetes_src: test/deploy
    kubernetes_templates: [api]
"#;

#[derive(Default)]
struct RecordingRunner {
    commands: RefCell<Vec<ToolCommand>>,
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &ToolCommand) -> Result<String> {
        self.commands.borrow_mut().push(command.clone());
        Ok(String::new())
    }
}

#[test_log::test]
fn test_init_selected_environment() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let ws = Workspace::new(parse_config(DESCRIPTOR).unwrap(), "prod", ".*", root.to_path_buf()).unwrap();
    let runner = RecordingRunner::default();

    init_project(&ws, &runner).unwrap();

    assert!(root.join(".git").is_dir());
    for dir in ["configs/api", "dist/configs/api", "cmd/api", "bin", "prod/configs/api"] {
        assert!(root.join(dir).is_dir(), "missing {dir}");
    }
    assert!(!root.join("test/deploy").exists());
    assert!(!root.join("bin/api").exists());

    let commands = runner.commands.borrow();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].to_string(), "go mod init github.com/acme/shop");
    assert_eq!(commands[0].dir.as_deref(), Some(root));

    let gitignore = fs::read_to_string(root.join(".gitignore")).unwrap();
    assert_eq!(gitignore, "bin/\ndist/\ntest/\nsecret.env\n");
}

#[test_log::test]
fn test_init_without_environment_covers_all_environments() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("go.mod"), "module github.com/acme/shop\n").unwrap();
    let ws = Workspace::new(parse_config(DESCRIPTOR).unwrap(), "", ".*", root.to_path_buf()).unwrap();
    let runner = RecordingRunner::default();

    init_project(&ws, &runner).unwrap();

    assert!(runner.commands.borrow().is_empty());
    assert!(root.join("prod/configs/api").is_dir());
    assert!(root.join("test/deploy/api").is_dir());
}

#[test_log::test]
fn test_init_is_repeatable() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let ws = Workspace::new(parse_config(DESCRIPTOR).unwrap(), "prod", ".*", root.to_path_buf()).unwrap();

    init_project(&ws, &RecordingRunner::default()).unwrap();
    let first = fs::read_to_string(root.join(".gitignore")).unwrap();
    init_project(&ws, &RecordingRunner::default()).unwrap();

    assert_eq!(fs::read_to_string(root.join(".gitignore")).unwrap(), first);
}

#[test_log::test]
fn test_create_env_directories_reports_new_directories() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let env = EnvConfig {
        config_src: "configs".into(),
        configs: vec!["api".into(), "db".into()],
        ..Default::default()
    };
    fs::create_dir_all(root.join("configs/api")).unwrap();

    let created = create_env_directories(root, "default", &env).unwrap();

    assert_eq!(created, vec![root.join("configs/db")]);
    assert!(create_env_directories(root, "default", &env).unwrap().is_empty());
}

#[test_log::test]
fn test_gitignore_keeps_existing_entries() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(".gitignore");
    fs::write(&path, "/bin\n*.env\ntarget/").unwrap();

    let added = ensure_gitignore(&path).unwrap();

    assert_eq!(added, vec!["dist/", "test/"]);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "/bin\n*.env\ntarget/\ndist/\ntest/\n"
    );
}

#[test_log::test]
fn test_gitignore_negated_entry_is_added_again() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(".gitignore");
    fs::write(&path, "bin/\ndist/\ntest/\n*.env\n!secret.env\n").unwrap();

    assert_eq!(ensure_gitignore(&path).unwrap(), vec!["secret.env"]);
}
