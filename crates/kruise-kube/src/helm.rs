//! helm command lines

use crate::command::Command;
use crate::prompt::Credentials;
use crate::unit::{HelmChart, HelmRepository};

/// `helm repo add <name> <url> --force-update [credentials]`
pub fn repo_add(repo: &HelmRepository, credentials: Option<&Credentials>) -> Command {
    let command = Command::helm()
        .args(["repo", "add"])
        .arg(&repo.name)
        .arg(&repo.url)
        .arg("--force-update");

    match credentials {
        Some(credentials) => command
            .arg("--username")
            .arg(&credentials.username)
            .arg("--password")
            .secret_arg(&credentials.password)
            .arg("--pass-credentials"),
        None => command,
    }
}

/// `helm repo remove <name>`
pub fn repo_remove(repo: &HelmRepository) -> Command {
    Command::helm().args(["repo", "remove"]).arg(&repo.name)
}

/// `helm repo update`
pub fn repo_update() -> Command {
    Command::helm().args(["repo", "update"])
}

/// `helm upgrade --install <release> <repo>/<chart> --namespace <ns> ...`
pub fn upgrade_install(chart: &HelmChart) -> Command {
    let mut command = Command::helm()
        .args(["upgrade", "--install"])
        .arg(&chart.release_name)
        .arg(chart.reference())
        .arg("--namespace")
        .arg(&chart.namespace)
        .opt("--version", &chart.version);

    for values in &chart.values {
        command = command.arg("-f").arg(values);
    }
    for set in &chart.set_values {
        command = command.arg("--set").arg(set);
    }
    command.args(&chart.install_args)
}

/// `helm uninstall <release> --namespace <ns> ...`
pub fn uninstall(chart: &HelmChart) -> Command {
    Command::helm()
        .arg("uninstall")
        .arg(&chart.release_name)
        .arg("--namespace")
        .arg(&chart.namespace)
        .args(&chart.uninstall_args)
}
