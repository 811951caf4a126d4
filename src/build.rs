//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: loading the document store
//! ([`crate::store`]), rendering detail and listing pages ([`crate::write`]),
//! and copying the static source directory into the static output directory.

use crate::config::Config;
use crate::store::{Error as StoreError, Store};
use crate::write::{Error as WriteError, WriteReport, Writer};
use gtmpl::Template;
use log::info;
use std::fs::File;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a successful [`build_site`] call produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildReport {
    /// Documents loaded into the store.
    pub documents: usize,

    /// Pages written and routes skipped.
    pub pages: WriteReport,

    /// Static files copied.
    pub static_files: usize,
}

/// Builds the site from a [`Config`] object. This calls into [`Store::load`]
/// and [`Writer::write_site`] which do the heavy-lifting. This function also
/// copies the static assets from source directory to the output directory.
/// Nothing is written unless every document loads.
pub fn build_site(config: &Config) -> Result<BuildReport> {
    let store = Store::load(&config.content_directory, &config.load_options())?;

    // Parse the template files.
    let page_template = parse_template(config.page_template.iter())?;
    let index_template = parse_template(config.index_template.iter())?;

    // Blow away only what a previous build generated, in case the user
    // points the output at a directory holding other files.
    for generated in ["pages", "posts", "tutorials", "blog", "static"] {
        rmdir(&config.output_directory.join(generated))?;
    }
    for generated in ["index.html", "404.html"] {
        rmfile(&config.output_directory.join(generated))?;
    }
    std::fs::create_dir_all(&config.output_directory)?;

    let writer = Writer {
        page_template: &page_template,
        index_template: &index_template,
        output_directory: &config.output_directory,
        site_title: &config.title,
        home_page: &config.site_root,
        static_url: &config.static_url,
    };
    let pages = writer.write_site(&store)?;

    let static_files = match config.static_source_directory.is_dir() {
        true => copy_dir(
            &config.static_source_directory,
            &config.static_output_directory,
        )?,
        false => 0,
    };

    let report = BuildReport {
        documents: store.len(),
        pages,
        static_files,
    };
    info!(
        "built {} pages from {} documents into `{}` ({} missing, {} static files)",
        report.pages.written,
        report.documents,
        config.output_directory.display(),
        report.pages.missing,
        report.static_files,
    );
    Ok(report)
}

fn copy_dir(src: &Path, dst: &Path) -> Result<usize> {
    let mut copied = 0;
    for result in WalkDir::new(src) {
        let entry = result?;
        // strip_prefix() should never fail since `src` is an ancestor of
        // every entry
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

// Loads the template file contents, concatenates them, and parses the result
// into a template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during loading, writing,
/// cleaning output directories, parsing template files, and other I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for errors loading the document store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Returned for errors writing pages to disk as HTML files.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Returned for I/O problems while cleaning previous output.
    #[error("Cleaning {path:?}: {err}")]
    Clean {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned for I/O problems while opening template files.
    #[error("Opening template file {path:?}: {err}")]
    OpenTemplateFile {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned for errors parsing template files.
    #[error("Parsing template: {0}")]
    ParseTemplate(String),

    /// Returned for errors walking the static directory.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn rmfile(file: &Path) -> Result<()> {
    match std::fs::remove_file(file) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: file.to_owned(),
                err: e,
            }),
        },
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rmfile_ignores_missing_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("index.html");
        rmfile(&file)?;
        std::fs::write(&file, "old")?;
        rmfile(&file)?;
        assert!(!file.exists());
        Ok(())
    }

    #[test]
    fn test_rmfile_reports_other_errors() -> Result<()> {
        let dir = tempfile::tempdir()?;
        // removing a directory with remove_file fails with something other
        // than NotFound
        let not_a_file = dir.path().join("index.html");
        std::fs::create_dir(&not_a_file)?;
        match rmfile(&not_a_file) {
            Err(Error::Clean { path, .. }) => assert_eq!(not_a_file, path),
            other => panic!("expected a clean error, got {:?}", other),
        }
        Ok(())
    }
}
