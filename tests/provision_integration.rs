//! Integration tests for the provisioning runner against a fake
//! terraform binary that records every invocation.

#![cfg(unix)]

use repoforge::terraform::{ProvisionOutcome, Terraform};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Install an executable fake terraform dispatching on its first
/// argument. Every invocation is appended to calls.log next to the
/// script.
fn fake_terraform(cases: &str) -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let bin = tmp.path().join("bin");
    let work = tmp.path().join("work");
    fs::create_dir_all(&bin).unwrap();
    fs::create_dir_all(&work).unwrap();

    let program = bin.join("terraform");
    let script = format!(
        "#!/bin/sh\n\
         echo \"$@\" >> \"$(dirname \"$0\")/calls.log\"\n\
         case \"$1\" in\n\
         {cases}\n\
         *) exit 1 ;;\n\
         esac\n"
    );
    fs::write(&program, script).unwrap();
    let mut perms = fs::metadata(&program).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&program, perms).unwrap();

    (tmp, program, work)
}

/// Pretend init already ran by planting both state markers
fn mark_initialized(work: &Path) {
    fs::create_dir(work.join(".terraform")).unwrap();
    fs::write(work.join("terraform.tfstate"), "{}").unwrap();
}

fn recorded_calls(tmp: &TempDir) -> Vec<String> {
    fs::read_to_string(tmp.path().join("bin/calls.log"))
        .unwrap_or_default()
        .lines()
        .map(|line| line.to_string())
        .collect()
}

#[test]
fn test_no_op_plan_reads_output_and_never_applies() {
    let (tmp, program, work) = fake_terraform(
        "plan) echo \"no changes are needed.\"; exit 0 ;;\n\
         output) echo \"   https://example.test/existing   \"; exit 0 ;;",
    );
    mark_initialized(&work);

    let outcome = Terraform::with_program(&program, &work).provision().unwrap();

    assert_eq!(
        outcome,
        ProvisionOutcome::UpToDate("https://example.test/existing".to_string())
    );
    let calls = recorded_calls(&tmp);
    assert_eq!(calls, vec!["plan", "output repository_url"]);
}

#[test]
fn test_pending_plan_applies_and_scrapes_url() {
    let (tmp, program, work) = fake_terraform(
        "plan) echo \"Plan: 1 to add, 0 to change, 0 to destroy.\"; exit 2 ;;\n\
         apply) echo \"github_repository.managed: Creating...\"; \
         echo \"repository_url = https://example.test/r\"; exit 0 ;;",
    );
    mark_initialized(&work);

    let outcome = Terraform::with_program(&program, &work).provision().unwrap();

    assert_eq!(
        outcome,
        ProvisionOutcome::Applied("https://example.test/r".to_string())
    );
    let calls = recorded_calls(&tmp);
    assert_eq!(calls, vec!["plan", "apply -auto-approve"]);
}

#[test]
fn test_apply_without_url_line_reports_failure() {
    let (_tmp, program, work) = fake_terraform(
        "plan) exit 2 ;;\n\
         apply) echo \"Apply complete! Resources: 1 added.\"; exit 0 ;;",
    );
    mark_initialized(&work);

    let outcome = Terraform::with_program(&program, &work).provision().unwrap();

    assert!(matches!(outcome, ProvisionOutcome::Failed(_)));
}

#[test]
fn test_failed_apply_reports_failure() {
    let (_tmp, program, work) = fake_terraform(
        "plan) exit 2 ;;\n\
         apply) echo \"Error: provider refused\" >&2; exit 1 ;;",
    );
    mark_initialized(&work);

    let outcome = Terraform::with_program(&program, &work).provision().unwrap();

    assert!(matches!(outcome, ProvisionOutcome::Failed(_)));
}

#[test]
fn test_unrecognized_plan_result_never_applies() {
    let (tmp, program, work) =
        fake_terraform("plan) echo \"something unexpected happened\"; exit 0 ;;");
    mark_initialized(&work);

    let outcome = Terraform::with_program(&program, &work).provision().unwrap();

    assert!(matches!(outcome, ProvisionOutcome::Failed(_)));
    let calls = recorded_calls(&tmp);
    assert_eq!(calls, vec!["plan"]);
}

#[test]
fn test_init_runs_first_in_a_fresh_directory() {
    let (tmp, program, work) = fake_terraform(
        "init) mkdir -p \"$PWD/.terraform\"; echo \"{}\" > \"$PWD/terraform.tfstate\"; exit 0 ;;\n\
         plan) echo \"no changes are needed.\"; exit 0 ;;\n\
         output) echo \"https://example.test/r\"; exit 0 ;;",
    );

    let outcome = Terraform::with_program(&program, &work).provision().unwrap();

    assert_eq!(
        outcome,
        ProvisionOutcome::UpToDate("https://example.test/r".to_string())
    );
    let calls = recorded_calls(&tmp);
    assert_eq!(calls, vec!["init", "plan", "output repository_url"]);
}

#[test]
fn test_init_skipped_when_state_markers_exist() {
    let (tmp, program, work) = fake_terraform(
        "plan) echo \"no changes are needed.\"; exit 0 ;;\n\
         output) echo \"https://example.test/r\"; exit 0 ;;",
    );
    mark_initialized(&work);

    Terraform::with_program(&program, &work).provision().unwrap();

    let calls = recorded_calls(&tmp);
    assert!(!calls.iter().any(|call| call.starts_with("init")));
}

#[test]
fn test_failed_init_is_fatal() {
    let (_tmp, program, work) = fake_terraform("init) exit 1 ;;");

    assert!(Terraform::with_program(&program, &work).provision().is_err());
}

#[test]
fn test_failed_output_degrades_to_failure() {
    let (_tmp, program, work) = fake_terraform(
        "plan) echo \"no changes are needed.\"; exit 0 ;;\n\
         output) echo \"No outputs found\" >&2; exit 1 ;;",
    );
    mark_initialized(&work);

    let outcome = Terraform::with_program(&program, &work).provision().unwrap();

    assert!(matches!(outcome, ProvisionOutcome::Failed(_)));
}

#[test]
fn test_destroy_passes_auto_approve() {
    let (tmp, program, work) = fake_terraform("destroy) exit 0 ;;");
    mark_initialized(&work);

    Terraform::with_program(&program, &work).destroy().unwrap();

    let calls = recorded_calls(&tmp);
    assert_eq!(calls, vec!["destroy -auto-approve"]);
}

#[test]
fn test_failed_destroy_is_fatal() {
    let (_tmp, program, work) = fake_terraform("destroy) exit 1 ;;");

    assert!(Terraform::with_program(&program, &work).destroy().is_err());
}
