//! Integration tests for CLI commands
//!
//! Everything runs in dry-run mode, so neither helm nor kubectl is needed.

use std::process::{Command, Output};

/// Get the fixtures path
fn fixtures_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures")
}

fn manifest() -> String {
    format!("{}/observability/kruise.yaml", fixtures_path())
}

/// Helper to run kruise against the observability fixture
fn kruise(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kruise"))
        .args(args)
        .env("KRUISE_CONFIG", manifest())
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute kruise")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

mod deploy_command {
    use super::*;

    #[test]
    fn test_dry_run_prints_commands() {
        let output = kruise(&["deploy", "--dry-run", "jaeger"]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));

        let out = stdout(&output);
        assert!(out.contains(
            "helm upgrade --install jaeger-operator jaegertracing/jaeger-operator --namespace observability --version 2.49.0"
        ));
        assert!(out.contains("kubectl apply --namespace observability -f manifests/jaeger-instance.yaml"));
        assert!(!out.contains("helm repo add"), "init units need --init");
    }

    #[test]
    fn test_profile_with_init() {
        let output = kruise(&["dep", "-d", "-c", "-i", "o11y", "jaeger"]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));

        let out = stdout(&output);
        assert_eq!(out.matches("helm repo add jaegertracing").count(), 1);
        assert!(out.contains("helm repo add prometheus-community"));
        assert!(out.contains("helm repo update"));
        assert!(out.contains(
            "kubectl create secret generic grafana-admin --namespace observability --from-literal admin-user=admin --from-literal admin-password=***"
        ));
        assert!(out.contains("--set grafana.enabled=true"));

        let repo_add = out.find("helm repo add").unwrap();
        let upgrade = out.find("helm upgrade --install").unwrap();
        assert!(repo_add < upgrade, "init phase runs first");
    }

    #[test]
    fn test_concurrent_priorities_in_order() {
        let output = kruise(&["deploy", "-d", "--concurrent", "jaeger"]);
        assert!(output.status.success());

        let out = stdout(&output);
        let chart = out.find("helm upgrade --install jaeger-operator").unwrap();
        let manifest = out.find("kubectl apply").unwrap();
        assert!(chart < manifest);
    }

    #[test]
    fn test_unknown_argument_suggests() {
        let output = kruise(&["deploy", "-d", "jager"]);
        assert_eq!(output.status.code(), Some(64));

        let err = stderr(&output);
        assert!(err.contains("Unknown deployment or profile 'jager'"));
        assert!(err.contains("jaeger"));
        assert!(stdout(&output).is_empty());
    }

    #[test]
    fn test_requires_arguments() {
        let output = kruise(&["deploy"]);
        assert!(!output.status.success());
    }
}

mod delete_command {
    use super::*;

    #[test]
    fn test_dry_run_delete() {
        let output = kruise(&["delete", "--dry-run", "prom", "mongo"]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));

        let out = stdout(&output);
        assert!(out.contains("helm uninstall prometheus-operator --namespace observability"));
        assert!(out.contains("helm uninstall mongodb --namespace data"));
        assert!(!out.contains("kubectl delete secret"));
        assert!(!out.contains("helm repo remove"));
    }

    #[test]
    fn test_delete_with_init() {
        let output = kruise(&["del", "-d", "-i", "mongodb"]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));

        let out = stdout(&output);
        let uninstall = out.find("helm uninstall mongodb").unwrap();
        let remove = out.find("helm repo remove bitnami").unwrap();
        assert!(uninstall < remove, "init units are removed last");
    }
}

mod list_command {
    use super::*;

    #[test]
    fn test_list() {
        let output = kruise(&["list"]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));

        let out = stdout(&output);
        assert!(out.contains("jaeger - Distributed tracing with Jaeger"));
        assert!(out.contains("prometheus-operator (prom, prometheus)"));
        assert!(out.contains("observability (o11y) [jaeger, prometheus-operator]"));
    }
}

mod config_errors {
    use super::*;

    #[test]
    fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let output = Command::new(env!("CARGO_BIN_EXE_kruise"))
            .arg("list")
            .current_dir(dir.path())
            .env("KRUISE_CONFIG", "")
            .env("HOME", dir.path())
            .env("XDG_CONFIG_HOME", dir.path().join(".config"))
            .output()
            .expect("Failed to execute kruise");

        assert_eq!(output.status.code(), Some(3));
        assert!(stderr(&output).contains("KRUISE_CONFIG"));
    }

    #[test]
    fn test_invalid_logger_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kruise.yaml");
        std::fs::write(&path, "apiVersion: v1alpha3\nlogger:\n  level: loud\n").unwrap();

        let output = Command::new(env!("CARGO_BIN_EXE_kruise"))
            .arg("list")
            .env("KRUISE_CONFIG", &path)
            .output()
            .expect("Failed to execute kruise");

        assert_eq!(output.status.code(), Some(3));
        assert!(stderr(&output).contains("loud"));
    }
}
