use crate::url::Permalinks;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "inkpost.yaml";

/// How the loader orders post source files before picking the most recent.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Lexicographically by file name. Relies on zero-padded id prefixes.
    Name,

    /// By file creation time.
    Time,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Name
    }
}

#[derive(Deserialize)]
struct RecentCount(usize);
impl Default for RecentCount {
    fn default() -> Self {
        RecentCount(10)
    }
}

#[derive(Deserialize)]
struct PublishCount(usize);
impl Default for PublishCount {
    fn default() -> Self {
        PublishCount(2)
    }
}

fn default_dir(name: &str) -> PathBuf {
    PathBuf::from(name)
}

#[derive(Deserialize)]
struct Project {
    #[serde(default = "Project::default_source")]
    source_directory: PathBuf,

    #[serde(default = "Project::default_output")]
    output_directory: PathBuf,

    #[serde(default = "Project::default_template")]
    template_directory: PathBuf,

    blog_name: String,
    url: Url,

    #[serde(default)]
    short_url: Option<Url>,

    #[serde(default)]
    recent_count: RecentCount,

    #[serde(default)]
    publish_count: PublishCount,

    #[serde(default)]
    sort: SortOrder,

    #[serde(default = "Project::default_post_extension")]
    post_extension: String,

    #[serde(default = "Project::default_page_extension")]
    page_extension: String,
}

impl Project {
    fn default_source() -> PathBuf {
        default_dir("source")
    }

    fn default_output() -> PathBuf {
        default_dir("output")
    }

    fn default_template() -> PathBuf {
        default_dir("template")
    }

    fn default_post_extension() -> String {
        "md".to_owned()
    }

    fn default_page_extension() -> String {
        "php".to_owned()
    }
}

/// The resolved configuration for one publishing run. Every directory is
/// absolute or relative to the process's working directory.
#[derive(Clone, Debug)]
pub struct Config {
    pub source_directory: PathBuf,
    pub output_directory: PathBuf,
    pub template_directory: PathBuf,
    pub blog_name: String,
    pub url: Url,
    pub short_url: Option<Url>,

    /// The number of most recent posts in the window.
    pub recent_count: usize,

    /// The number of trailing posts whose pages are re-rendered each run
    /// (newest plus predecessor by default).
    pub publish_count: usize,
    pub sort: SortOrder,
    pub post_extension: String,
    pub page_extension: String,
}

impl Config {
    /// Searches `dir` and its ancestors for [`PROJECT_FILE`] and loads the
    /// first one found.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            match Config::from_project_file(&path) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            match dir.parent() {
                Some(dir) => Config::from_directory(dir),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    /// Loads a project file. Relative directories in the file are resolved
    /// against the file's own directory.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path)
            .map_err(|e| anyhow!("Opening project file `{}`: {}", path.display(), e))?;
        let project: Project = serde_yaml::from_reader(file)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Config {
                source_directory: project_root.join(project.source_directory),
                output_directory: project_root.join(project.output_directory),
                template_directory: project_root.join(project.template_directory),
                blog_name: project.blog_name,
                url: project.url,
                short_url: project.short_url,
                recent_count: project.recent_count.0,
                publish_count: project.publish_count.0,
                sort: project.sort,
                post_extension: project.post_extension,
                page_extension: project.page_extension,
            }
            .validated(),
        }
    }

    /// Returns the configuration unchanged if its counts are usable. A window
    /// of zero posts would publish nothing while posts exist.
    pub fn validated(self) -> Result<Config> {
        if self.recent_count == 0 {
            return Err(anyhow!("`recent_count` must be at least 1"));
        }
        Ok(self)
    }

    pub fn permalinks(&self) -> Permalinks {
        Permalinks::new(self.url.clone(), self.short_url.clone())
    }

    /// The file name of the root document and of the page template, e.g.
    /// `index.php`.
    pub fn root_file_name(&self) -> String {
        format!("index.{}", self.page_extension)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_directory_with_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join(PROJECT_FILE),
            "blog_name: Ink\nurl: https://blog.example.org\n",
        )?;
        let nested = dir.path().join("source").join("drafts");
        std::fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested)?;
        assert_eq!(dir.path().join("source"), config.source_directory);
        assert_eq!(dir.path().join("output"), config.output_directory);
        assert_eq!(dir.path().join("template"), config.template_directory);
        assert_eq!("Ink", config.blog_name);
        assert_eq!(None, config.short_url);
        assert_eq!(10, config.recent_count);
        assert_eq!(2, config.publish_count);
        assert_eq!(SortOrder::Name, config.sort);
        assert_eq!("index.php", config.root_file_name());
        Ok(())
    }

    #[test]
    fn test_from_project_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PROJECT_FILE);
        std::fs::write(
            &path,
            "blog_name: Ink\nurl: https://blog.example.org\nshort_url: https://ex.in/b\n\
             output_directory: /srv/blog\nrecent_count: 5\nsort: time\npage_extension: html\n",
        )?;

        let config = Config::from_project_file(&path)?;
        assert_eq!(PathBuf::from("/srv/blog"), config.output_directory);
        assert_eq!(5, config.recent_count);
        assert_eq!(SortOrder::Time, config.sort);
        assert_eq!("index.html", config.root_file_name());
        assert_eq!(
            "https://ex.in/b/0001",
            config
                .permalinks()
                .short_link(&crate::post::PostRecord {
                    id: 1,
                    ..Default::default()
                })?
                .as_str()
        );
        Ok(())
    }

    #[test]
    fn test_missing_url_is_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PROJECT_FILE);
        std::fs::write(&path, "blog_name: Ink\n")?;
        assert!(Config::from_project_file(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_zero_recent_count_is_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PROJECT_FILE);
        std::fs::write(
            &path,
            "blog_name: Ink\nurl: https://blog.example.org\nrecent_count: 0\n",
        )?;
        let err = match Config::from_project_file(&path) {
            Err(err) => err,
            Ok(config) => panic!("expected an error, got {:?}", config),
        };
        assert!(err.to_string().contains("recent_count"));
        Ok(())
    }
}
