use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn jurnal(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("jurnal").unwrap();
    cmd.env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env("RUST_LOG", "warn");
    cmd
}

/// A fresh home with an initialized data directory and the demo batch loaded.
fn demo_home() -> TempDir {
    let home = tempfile::tempdir().unwrap();
    let data_dir = home.path().join("books");
    jurnal(&home)
        .args(["init", "--data-dir", data_dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized jurnal"));
    jurnal(&home)
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Demo data loaded!"));
    home
}

#[test]
fn test_demo_is_idempotent() {
    let home = demo_home();
    jurnal(&home)
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("already loaded"));
    jurnal(&home)
        .arg("batches")
        .assert()
        .success()
        .stdout(predicate::str::contains("demo-journal.xlsx").and(predicate::str::contains("uploaded")));
}

#[test]
fn test_process_then_status_and_rows() {
    let home = demo_home();
    jurnal(&home)
        .args(["process", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Batch 1 completed: 15 processed, 0 failed."));

    jurnal(&home)
        .args(["status", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("completed").and(predicate::str::contains("100.00%")));

    jurnal(&home)
        .args(["rows", "1"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("25,000.00")
                .and(predicate::str::contains("Koreksi Positif"))
                .and(predicate::str::contains("Wth 21 Cr")),
        );

    // A completed batch is left alone.
    jurnal(&home)
        .args(["process", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already completed"));
}

#[test]
fn test_cancel_before_processing() {
    let home = demo_home();
    jurnal(&home)
        .args(["cancel", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Canceled batch 1."));
    jurnal(&home)
        .args(["process", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already canceled"));
    jurnal(&home)
        .args(["cancel", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already canceled"));
}

#[test]
fn test_unknown_batch_fails() {
    let home = demo_home();
    jurnal(&home)
        .args(["process", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown batch: 99"));
    jurnal(&home)
        .args(["status", "99"])
        .assert()
        .failure();
}

#[test]
fn test_several_ids_use_worker_pool() {
    let home = demo_home();
    jurnal(&home)
        .args(["process", "1", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Batch 1 completed"));
}

#[test]
fn test_label_override_and_propagate() {
    let home = demo_home();
    jurnal(&home).args(["process", "1"]).assert().success();
    jurnal(&home)
        .args(["label", "1", "--koreksi", "Koreksi Manual"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Labelled row 1"));
    jurnal(&home)
        .args(["rows", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Koreksi Manual - Obyek PPh 21").not())
        .stdout(predicate::str::contains("Koreksi Manual"));
    jurnal(&home)
        .args(["propagate", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 bucket update(s)"));
    jurnal(&home)
        .args(["label", "999", "--obyek", "X"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No transaction with ID 999"));
}

#[test]
fn test_rule_management() {
    let home = demo_home();
    jurnal(&home)
        .args(["rules", "add-wht", "pph 26", "--tax-type", "wth_26", "--rate", "0.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wth 26 Cr"));
    jurnal(&home)
        .args(["rules", "add-wht", "pph 99", "--tax-type", "wth_99", "--rate", "0.2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown tax type: wth_99"));
    jurnal(&home)
        .args(["rules", "add-keyword", "ppn impor", "--category", "input"])
        .assert()
        .success();
    jurnal(&home)
        .args(["rules", "delete", "koreksi", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted rule 1"));
    jurnal(&home)
        .args(["rules", "delete", "koreksi", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already inactive"));
    jurnal(&home)
        .args(["rules", "add-koreksi", "jamuan", "Koreksi Positif", "--exclusion", "Non Koreksi"])
        .assert()
        .success();
    jurnal(&home)
        .args(["rules", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("pph 26")
                .and(predicate::str::contains("ppn impor"))
                .and(predicate::str::contains("Non Koreksi")),
        );
}

#[test]
fn test_accounts_add_and_list() {
    let home = demo_home();
    jurnal(&home)
        .args(["accounts", "add", "2143", "Utang PPh 26", "--nature", "Liability", "--tag", "wth 26 cr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[Wth 26 Cr]"));
    jurnal(&home)
        .args(["accounts", "add", "9999", "Bad", "--tag", "Wth 99 Cr"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown correction tag: Wth 99 Cr"));
    jurnal(&home)
        .args(["accounts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Utang PPh 26"));
}
