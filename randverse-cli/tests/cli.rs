use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::{tempdir, TempDir};

struct Fixture {
    home: TempDir,
    corpus: PathBuf,
}

fn fixture() -> Fixture {
    let home = tempdir().unwrap();
    let src = home.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(
        src.join("genesis.txt"),
        "1:1 In the beginning\n1:2 And the earth\n1:3 And God said\n",
    )
    .unwrap();
    fs::write(src.join("exodus.txt"), "1:1 Now these\n1:2 Reuben\n").unwrap();
    fs::write(src.join("matthew.txt"), "1:1 The book\n").unwrap();
    fs::write(
        src.join("books.toml"),
        r#"
[[books]]
id = 10
name = "Genesis"
file = "genesis.txt"

[[books]]
id = 20
name = "Exodus"
file = "exodus.txt"

[[books]]
id = 470
name = "Matthew"
file = "matthew.txt"
"#,
    )
    .unwrap();

    let corpus = home.path().join("corpus");
    randverse_cmd(home.path())
        .arg("pack")
        .arg(src.join("books.toml"))
        .arg(&corpus)
        .assert()
        .success();
    Fixture { home, corpus }
}

fn randverse_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("randverse").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("RUST_LOG");
    cmd
}

fn run(fixture: &Fixture, args: &[&str]) -> (bool, String, String) {
    let output = randverse_cmd(fixture.home.path())
        .arg("--corpus")
        .arg(&fixture.corpus)
        .args(args)
        .output()
        .unwrap();
    (
        output.status.success(),
        String::from_utf8(output.stdout).unwrap(),
        String::from_utf8(output.stderr).unwrap(),
    )
}

#[test]
fn pack_writes_index_and_books() {
    let fixture = fixture();
    let index = fs::read_to_string(fixture.corpus.join("index.txt")).unwrap();
    assert_eq!(index, "10|Genesis|3\n20|Exodus|2\n470|Matthew|1\n");
    assert!(fixture.corpus.join("470.txt.gz").exists());
}

#[test]
fn prints_verse_from_category() {
    let fixture = fixture();
    for seed in 0..5 {
        let seed = seed.to_string();
        let (ok, stdout, _) = run(&fixture, &["--narrow", "pentateuch", "--seed", &seed]);
        assert!(ok);
        assert!(stdout.starts_with("Genesis (line ") || stdout.starts_with("Exodus (line "));
        let lines: Vec<_> = stdout.lines().collect();
        assert_eq!(lines.len(), 3, "{stdout}");
        assert!(lines[2].starts_with("1:"));
    }
}

#[test]
fn same_seed_gives_same_verse() {
    let fixture = fixture();
    let (_, first, _) = run(&fixture, &["--seed", "99"]);
    let (_, second, _) = run(&fixture, &["--seed", "99"]);
    assert_eq!(first, second);
}

#[test]
fn remaining_prints_to_end_of_book() {
    let fixture = fixture();
    let (ok, stdout, _) = run(&fixture, &["--narrow", "gospels", "--remaining"]);
    assert!(ok);
    assert_eq!(stdout, "Matthew (line 1/1)\n\n1:1 The book\n");
}

#[test]
fn invalid_category_lists_accepted_values() {
    let fixture = fixture();
    let (ok, stdout, stderr) = run(&fixture, &["--narrow", "apocrypha"]);
    assert!(!ok);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Invalid category: apocrypha"));
    assert!(stderr.contains("Accepted values:"));
    assert!(stderr.contains("  pentateuch — Genesis — Exodus"));
    assert!(stderr.contains("  gospels — Matthew"));
}

#[test]
fn empty_category_reports_no_verses() {
    let fixture = fixture();
    let (ok, stdout, stderr) = run(&fixture, &["--narrow", "revelation"]);
    assert!(!ok);
    assert!(stdout.is_empty());
    assert!(stderr.contains("No verses available for this selection."));
}

#[test]
fn missing_book_reports_extraction_failure() {
    let fixture = fixture();
    fs::remove_file(fixture.corpus.join("470.txt.gz")).unwrap();
    let (ok, _, stderr) = run(&fixture, &["--narrow", "gospels"]);
    assert!(!ok);
    assert!(stderr.contains("Book content not found."));
}

#[test]
fn categories_command_lists_labels() {
    let fixture = fixture();
    let (ok, stdout, _) = run(&fixture, &["categories"]);
    assert!(ok);
    assert!(stdout.starts_with("  ot — Genesis — Exodus\n  nt — Matthew\n"));
}

#[test]
fn config_file_supplies_categories() {
    let fixture = fixture();
    let config = fixture.home.path().join("randverse.toml");
    fs::write(
        &config,
        "[[categories]]\nkey = \"law\"\nlow = 10\nhigh = 20\n",
    )
    .unwrap();
    let config = config.to_string_lossy().into_owned();
    let (ok, stdout, _) = run(&fixture, &["--config", &config, "categories"]);
    assert!(ok);
    assert_eq!(stdout, "  law — Genesis — Exodus\n");
}

#[test]
fn missing_corpus_fails_startup() {
    let fixture = fixture();
    let output = randverse_cmd(fixture.home.path())
        .arg("--corpus")
        .arg(fixture.home.path().join("nowhere"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("failed to load corpus"));
}
