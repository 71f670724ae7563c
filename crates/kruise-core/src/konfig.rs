//! Manifest discovery and loading
//!
//! If `KRUISE_CONFIG` is set it names the manifest, either a path or an
//! `http(s)://` URL. Otherwise the following locations are searched in order
//! and the first existing file wins:
//!
//! - `./kruise.{yaml,yml,json}`
//! - `<config dir>/kruise/kruise.{yaml,yml,json}`
//! - `./.kruise.{yaml,yml,json}`
//! - `<config dir>/kruise/.kruise.{yaml,yml,json}`
//! - `~/.kruise.{yaml,yml,json}`

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{CoreError, Result};
use crate::schema::{API_VERSION, KruiseConfig};

/// Environment variable overriding manifest discovery
pub const CONFIG_ENV: &str = "KRUISE_CONFIG";

const CONFIG_NAME: &str = "kruise";
const EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Where a manifest was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Url(Url),
}

impl ConfigSource {
    /// Interpret the value of `KRUISE_CONFIG`
    pub fn from_override(value: &str) -> Result<Self> {
        if value.starts_with("http://") || value.starts_with("https://") {
            Ok(Self::Url(Url::parse(value)?))
        } else {
            Ok(Self::File(PathBuf::from(value)))
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// A parsed manifest together with its origin
#[derive(Debug, Clone)]
pub struct Konfig {
    pub source: ConfigSource,
    pub manifest: KruiseConfig,
    overridden: bool,
}

impl Konfig {
    /// Load the manifest named by `KRUISE_CONFIG`, or discover one
    pub async fn load() -> Result<Self> {
        if let Ok(value) = std::env::var(CONFIG_ENV)
            && !value.trim().is_empty()
        {
            return Self::load_override(value.trim()).await;
        }

        let cwd = std::env::current_dir()?;
        let searched = search_locations(
            &cwd,
            dirs::config_dir().as_deref(),
            dirs::home_dir().as_deref(),
        );
        match searched.iter().find(|p| p.is_file()) {
            Some(path) => Self::load_file(path),
            None => Err(CoreError::ConfigNotFound { searched }),
        }
    }

    /// Load the manifest a `KRUISE_CONFIG` value points at
    pub async fn load_override(value: &str) -> Result<Self> {
        let source = ConfigSource::from_override(value)?;
        let mut konfig = Self::load_from(source).await?;
        konfig.overridden = true;
        Ok(konfig)
    }

    /// Load a manifest from an explicit source
    pub async fn load_from(source: ConfigSource) -> Result<Self> {
        match source {
            ConfigSource::File(path) => Self::load_file(&path),
            ConfigSource::Url(url) => {
                let content = fetch(&url).await?;
                let manifest = parse(&content, Format::Yaml)?;
                Ok(Self::new(ConfigSource::Url(url), manifest))
            }
        }
    }

    /// Load a manifest from a local file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let manifest = parse(&content, Format::from_path(path))?;
        Ok(Self::new(ConfigSource::File(path.to_path_buf()), manifest))
    }

    fn new(source: ConfigSource, manifest: KruiseConfig) -> Self {
        Self {
            source,
            manifest,
            overridden: false,
        }
    }

    /// Whether the manifest was named by `KRUISE_CONFIG` rather than discovered
    pub fn is_overridden(&self) -> bool {
        self.overridden
    }

    /// Whether the manifest declares the apiVersion this release understands
    pub fn is_current_version(&self) -> bool {
        self.manifest.api_version == API_VERSION
    }

    /// Log where the manifest came from and warn about version drift
    ///
    /// Separate from loading so callers can install a subscriber configured
    /// from the manifest first.
    pub fn announce(&self) {
        if self.overridden {
            tracing::debug!("Using manifest defined by {}: {}", CONFIG_ENV, self.source);
        }
        tracing::info!("Using config file: {}", self.source);
        if !self.is_current_version() {
            tracing::warn!(
                "Manifest {} declares apiVersion '{}', this kruise understands '{}'",
                self.source,
                self.manifest.api_version,
                API_VERSION
            );
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

impl Format {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

fn parse(content: &str, format: Format) -> Result<KruiseConfig> {
    let manifest = match format {
        Format::Yaml => serde_yaml::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    };
    Ok(manifest)
}

async fn fetch(url: &Url) -> Result<String> {
    let response = reqwest::get(url.clone()).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CoreError::ConfigFetch {
            url: url.to_string(),
            message: status.to_string(),
        });
    }
    Ok(response.text().await?)
}

/// Candidate manifest paths in lookup order
pub fn search_locations(
    cwd: &Path,
    config_dir: Option<&Path>,
    home: Option<&Path>,
) -> Vec<PathBuf> {
    let app_dir = config_dir.map(|d| d.join(CONFIG_NAME));

    let mut visible: Vec<&Path> = vec![cwd];
    visible.extend(app_dir.as_deref());

    let mut hidden: Vec<&Path> = vec![cwd];
    hidden.extend(app_dir.as_deref());
    hidden.extend(home);

    let named = |dirs: &[&Path], stem: &str| -> Vec<PathBuf> {
        dirs.iter()
            .flat_map(|dir| {
                EXTENSIONS
                    .iter()
                    .map(move |ext| dir.join(format!("{}.{}", stem, ext)))
            })
            .collect()
    };

    let mut locations = named(&visible, CONFIG_NAME);
    locations.extend(named(&hidden, &format!(".{}", CONFIG_NAME)));
    locations
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MANIFEST: &str = r#"
apiVersion: v1alpha3
kind: Config
deploy:
  deployments:
    - name: kafka
      helm:
        charts:
          - chartName: kafka
            releaseName: kafka
            repoName: bitnami
"#;

    #[test]
    fn test_override_detection() {
        assert_eq!(
            ConfigSource::from_override("/etc/kruise.yaml").unwrap(),
            ConfigSource::File(PathBuf::from("/etc/kruise.yaml"))
        );
        assert!(matches!(
            ConfigSource::from_override("https://example.com/kruise.yaml").unwrap(),
            ConfigSource::Url(_)
        ));
    }

    #[test]
    fn test_search_order() {
        let locations = search_locations(
            Path::new("/work"),
            Some(Path::new("/cfg")),
            Some(Path::new("/home/me")),
        );

        assert_eq!(locations[0], PathBuf::from("/work/kruise.yaml"));
        assert_eq!(locations[3], PathBuf::from("/cfg/kruise/kruise.yaml"));
        assert_eq!(locations[6], PathBuf::from("/work/.kruise.yaml"));
        assert_eq!(locations[9], PathBuf::from("/cfg/kruise/.kruise.yaml"));
        assert_eq!(
            locations.last().unwrap(),
            &PathBuf::from("/home/me/.kruise.json")
        );
        assert_eq!(locations.len(), 15);
    }

    #[test]
    fn test_search_without_dirs() {
        let locations = search_locations(Path::new("/work"), None, None);
        assert_eq!(locations.len(), 6);
        assert!(locations.iter().all(|p| p.starts_with("/work")));
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kruise.yaml");
        std::fs::write(&path, MANIFEST).unwrap();

        let konfig = Konfig::load_file(&path).unwrap();
        assert_eq!(konfig.source, ConfigSource::File(path));
        assert_eq!(konfig.manifest.deploy.deployments[0].name, "kafka");
        assert!(konfig.is_current_version());
    }

    #[tokio::test]
    async fn test_load_override_marks_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("team.yaml");
        std::fs::write(&path, MANIFEST).unwrap();

        let konfig = Konfig::load_override(path.to_str().unwrap()).await.unwrap();
        assert!(konfig.is_overridden());
        assert_eq!(konfig.source, ConfigSource::File(path.clone()));

        assert!(!Konfig::load_file(&path).unwrap().is_overridden());
    }

    #[test]
    fn test_load_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kruise.json");
        std::fs::write(
            &path,
            r#"{"apiVersion":"v1alpha3","deploy":{"profiles":[{"name":"all","items":["kafka"]}]}}"#,
        )
        .unwrap();

        let konfig = Konfig::load_file(&path).unwrap();
        assert_eq!(konfig.manifest.deploy.profiles[0].items, vec!["kafka"]);

        std::fs::write(&path, r#"{"apiVersion":"v1alpha2"}"#).unwrap();
        assert!(!Konfig::load_file(&path).unwrap().is_current_version());
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kruise.yaml");
        std::fs::write(&path, "deploy: [not, a, map]").unwrap();

        assert!(matches!(
            Konfig::load_file(&path),
            Err(CoreError::YamlParse(_))
        ));
    }

    #[tokio::test]
    async fn test_load_from_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/kruise.yaml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MANIFEST))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/kruise.yaml", server.uri())).unwrap();
        let konfig = Konfig::load_from(ConfigSource::Url(url)).await.unwrap();
        assert_eq!(konfig.manifest.deploy.deployments.len(), 1);
    }

    #[tokio::test]
    async fn test_load_from_url_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing.yaml", server.uri())).unwrap();
        let err = Konfig::load_from(ConfigSource::Url(url)).await.unwrap_err();
        assert!(matches!(err, CoreError::ConfigFetch { .. }));
    }
}
