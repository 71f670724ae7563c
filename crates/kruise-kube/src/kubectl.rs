//! kubectl command lines
//!
//! `--namespace` is omitted for secrets in the `default` namespace.

use crate::command::Command;
use crate::prompt::Credentials;
use crate::unit::Manifest;

pub(crate) const DEFAULT_NAMESPACE: &str = "default";

fn namespaced(command: Command, namespace: &str) -> Command {
    if namespace.is_empty() || namespace == DEFAULT_NAMESPACE {
        command
    } else {
        command.arg("--namespace").arg(namespace)
    }
}

/// `kubectl create namespace <ns>`, expected to fail when it already exists
pub fn create_namespace(namespace: &str) -> Command {
    Command::kubectl()
        .args(["create", "namespace"])
        .arg(namespace)
        .quiet()
}

/// `kubectl apply --namespace <ns> -f <path>...`
pub fn apply(manifest: &Manifest) -> Command {
    with_paths(
        Command::kubectl()
            .arg("apply")
            .arg("--namespace")
            .arg(&manifest.namespace),
        &manifest.paths,
    )
}

/// `kubectl delete --namespace <ns> -f <path>...`
pub fn delete(manifest: &Manifest) -> Command {
    with_paths(
        Command::kubectl()
            .arg("delete")
            .arg("--namespace")
            .arg(&manifest.namespace),
        &manifest.paths,
    )
}

fn with_paths(mut command: Command, paths: &[String]) -> Command {
    for path in paths {
        command = command.arg("-f").arg(path);
    }
    command
}

/// `kubectl delete secret <name> [--namespace <ns>]`
pub fn delete_secret(name: &str, namespace: &str) -> Command {
    namespaced(Command::kubectl().args(["delete", "secret"]).arg(name), namespace)
}

/// A `--from-literal` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub key: String,
    pub value: String,
    /// Value came from the prompter and must be masked
    pub prompted: bool,
}

/// `kubectl create secret generic <name> [--namespace <ns>] --from-literal <k>=<v>...`
pub fn create_generic_secret(name: &str, namespace: &str, literals: &[Literal]) -> Command {
    let mut command = namespaced(
        Command::kubectl()
            .args(["create", "secret", "generic"])
            .arg(name),
        namespace,
    );
    for literal in literals {
        let entry = format!("{}={}", literal.key, literal.value);
        command = command.arg("--from-literal");
        command = if literal.prompted {
            command.secret_arg(entry)
        } else {
            command.arg(entry)
        };
    }
    command
}

/// `kubectl create secret docker-registry <name> [--namespace <ns>] --docker-server ...`
pub fn create_docker_registry_secret(
    name: &str,
    namespace: &str,
    registry: &str,
    credentials: &Credentials,
) -> Command {
    namespaced(
        Command::kubectl()
            .args(["create", "secret", "docker-registry"])
            .arg(name),
        namespace,
    )
    .arg("--docker-server")
    .arg(registry)
    .arg("--docker-username")
    .arg(&credentials.username)
    .arg("--docker-password")
    .secret_arg(&credentials.password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_commands() {
        let manifest = Manifest {
            namespace: "istio-system".to_string(),
            paths: vec!["gateway.yaml".to_string(), "vs.yaml".to_string()],
            priority: 2,
            init: false,
        };
        insta::assert_snapshot!(
            apply(&manifest).to_string(),
            @"kubectl apply --namespace istio-system -f gateway.yaml -f vs.yaml"
        );
        insta::assert_snapshot!(
            delete(&manifest).to_string(),
            @"kubectl delete --namespace istio-system -f gateway.yaml -f vs.yaml"
        );
    }

    #[test]
    fn test_namespace_flag_omitted_for_default() {
        assert_eq!(
            delete_secret("regcred", "default").to_string(),
            "kubectl delete secret regcred"
        );
        assert_eq!(
            delete_secret("regcred", "ci").to_string(),
            "kubectl delete secret regcred --namespace ci"
        );
        assert!(create_namespace("ci").is_quiet());
    }

    #[test]
    fn test_generic_secret() {
        let literals = vec![
            Literal {
                key: "user".to_string(),
                value: "admin".to_string(),
                prompted: false,
            },
            Literal {
                key: "password".to_string(),
                value: "s3cret".to_string(),
                prompted: true,
            },
        ];
        insta::assert_snapshot!(
            create_generic_secret("db-creds", "database", &literals).to_string(),
            @"kubectl create secret generic db-creds --namespace database --from-literal user=admin --from-literal password=***"
        );
    }

    #[test]
    fn test_docker_registry_secret() {
        let credentials = Credentials {
            username: "robot".to_string(),
            password: "token".to_string(),
        };
        insta::assert_snapshot!(
            create_docker_registry_secret("regcred", "default", "ghcr.io", &credentials).to_string(),
            @"kubectl create secret docker-registry regcred --docker-server ghcr.io --docker-username robot --docker-password ***"
        );
    }
}
