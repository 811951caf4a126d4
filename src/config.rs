use crate::document::DEFAULT_WORDS_PER_MINUTE;
use crate::store::LoadOptions;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file, searched for from the working directory
/// upward.
pub const PROJECT_FILE: &str = "folio.yaml";

#[derive(Deserialize)]
struct WordsPerMinute(usize);
impl Default for WordsPerMinute {
    fn default() -> Self {
        WordsPerMinute(DEFAULT_WORDS_PER_MINUTE)
    }
}

#[derive(Deserialize)]
struct Project {
    pub title: String,
    pub site_root: Url,

    #[serde(default)]
    pub words_per_minute: WordsPerMinute,

    #[serde(default)]
    pub threads: Option<usize>,
}

#[derive(Deserialize)]
struct Theme {
    page_template: Vec<PathBuf>,
    index_template: Vec<PathBuf>,
}

pub struct Config {
    pub title: String,
    pub site_root: Url,
    pub static_url: Url,
    pub content_directory: PathBuf,
    pub static_source_directory: PathBuf,
    pub page_template: Vec<PathBuf>,
    pub index_template: Vec<PathBuf>,
    pub output_directory: PathBuf,
    pub static_output_directory: PathBuf,
    pub words_per_minute: usize,
    pub threads: usize,
}

impl Config {
    /// Looks for a [`PROJECT_FILE`] in `dir` and then in each of its
    /// ancestors, and loads the first one found. See
    /// [`Config::from_project_file`] for the meaning of the other arguments.
    pub fn from_directory(
        dir: &Path,
        output_directory: Option<&Path>,
        threads: Option<usize>,
    ) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            match Config::from_project_file(&path, output_directory, threads) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:#}", e)),
            }
        } else {
            match dir.parent() {
                Some(dir) => Config::from_directory(dir, output_directory, threads),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    /// Loads the project file at `path` and the theme file at
    /// `{project_root}/theme/theme.yaml`. Content is read from
    /// `{project_root}/content` and static assets from
    /// `{project_root}/static`. The output goes to `output_directory`, or
    /// `{project_root}/_output` if none is given. `threads` overrides the
    /// project file's `threads` setting.
    pub fn from_project_file(
        path: &Path,
        output_directory: Option<&Path>,
        threads: Option<usize>,
    ) -> Result<Config> {
        use crate::util::open;
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        if project.words_per_minute.0 == 0 {
            return Err(anyhow!("`words_per_minute` must be greater than zero"));
        }
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => {
                let theme_dir = project_root.join("theme");
                let theme_file = open(&theme_dir.join("theme.yaml"), "theme")?;
                let theme: Theme = serde_yaml::from_reader(theme_file)?;
                let site_root = with_trailing_slash(project.site_root);
                let output_directory = match output_directory {
                    Some(dir) => dir.to_owned(),
                    None => project_root.join("_output"),
                };
                Ok(Config {
                    title: project.title,
                    static_url: site_root.join("static/")?,
                    site_root,
                    content_directory: project_root.join("content"),
                    static_source_directory: project_root.join("static"),
                    page_template: theme
                        .page_template
                        .iter()
                        .map(|relpath| theme_dir.join(relpath))
                        .collect(),
                    index_template: theme
                        .index_template
                        .iter()
                        .map(|relpath| theme_dir.join(relpath))
                        .collect(),
                    static_output_directory: output_directory.join("static"),
                    output_directory,
                    words_per_minute: project.words_per_minute.0,
                    threads: threads.or(project.threads).unwrap_or(0),
                })
            }
        }
    }

    /// The options for loading the content [`crate::store::Store`].
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            site_root: self.site_root.clone(),
            words_per_minute: self.words_per_minute,
            threads: self.threads,
        }
    }
}

// A base URL without a trailing slash would have its last segment replaced on
// `Url::join`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn project(dir: &Path, project_yaml: &str) -> Result<()> {
        fs::create_dir_all(dir.join("theme"))?;
        fs::write(dir.join(PROJECT_FILE), project_yaml)?;
        fs::write(
            dir.join("theme/theme.yaml"),
            "page_template: [base.html, page.html]\nindex_template: [base.html, index.html]\n",
        )?;
        Ok(())
    }

    #[test]
    fn test_from_directory_searches_upward() -> Result<()> {
        let dir = tempfile::tempdir()?;
        project(
            dir.path(),
            "title: Example\nsite_root: https://example.org/blog\nthreads: 3\n",
        )?;
        let nested = dir.path().join("content/posts");
        fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested, None, None)?;
        assert_eq!("Example", config.title);
        assert_eq!("https://example.org/blog/", config.site_root.as_str());
        assert_eq!("https://example.org/blog/static/", config.static_url.as_str());
        assert_eq!(DEFAULT_WORDS_PER_MINUTE, config.words_per_minute);
        assert_eq!(3, config.threads);
        assert_eq!(dir.path().join("content"), config.content_directory);
        assert_eq!(dir.path().join("_output"), config.output_directory);
        assert_eq!(
            vec![
                dir.path().join("theme/base.html"),
                dir.path().join("theme/page.html")
            ],
            config.page_template
        );
        Ok(())
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let dir = tempfile::tempdir()?;
        project(
            dir.path(),
            "title: Example\nsite_root: https://example.org/\nwords_per_minute: 250\n",
        )?;
        let out = dir.path().join("public");
        let config = Config::from_directory(dir.path(), Some(&out), Some(2))?;
        assert_eq!(out, config.output_directory);
        assert_eq!(out.join("static"), config.static_output_directory);
        assert_eq!(250, config.words_per_minute);
        assert_eq!(2, config.threads);
        Ok(())
    }

    #[test]
    fn test_rejects_zero_words_per_minute() -> Result<()> {
        let dir = tempfile::tempdir()?;
        project(
            dir.path(),
            "title: Example\nsite_root: https://example.org/\nwords_per_minute: 0\n",
        )?;
        assert!(Config::from_directory(dir.path(), None, None).is_err());
        Ok(())
    }
}
