use folio::build::{build_site, Error as BuildError};
use folio::config::Config;
use folio::document::CollectionType;
use folio::route::{enumerate_routes, RouteParams};
use folio::store::Store;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const PAGE_TEMPLATE: &str = r#"<html><head><title>{{ .item.title }} | {{ .site_title }}</title></head>
<body><h1>{{ .item.title }}</h1><p class="reading-time">{{ .item.reading_time.text }}</p>
{{ .item.body }}
<ul>{{ range .item.children }}<li><a href="{{ .url }}">{{ .title }}</a></li>{{ end }}</ul>
</body></html>
"#;

const INDEX_TEMPLATE: &str = r#"<html><head><title>{{ .item.title }} | {{ .site_title }}</title></head>
<body><ul>{{ range .item.entries }}<li><a href="{{ .url }}">{{ .title }}</a> {{ .reading_time.text }}</li>{{ end }}</ul></body></html>
"#;

fn write(root: &Path, relative: &str, contents: &str) -> Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

fn project() -> Result<TempDir> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write(
        root,
        "folio.yaml",
        "title: Example\nsite_root: https://example.org/\nthreads: 2\n",
    )?;
    write(
        root,
        "theme/theme.yaml",
        "page_template: [page.html]\nindex_template: [index.html]\n",
    )?;
    write(root, "theme/page.html", PAGE_TEMPLATE)?;
    write(root, "theme/index.html", INDEX_TEMPLATE)?;
    write(root, "static/style.css", "body { margin: 0; }\n")?;

    let words = "word ".repeat(400);
    write(
        root,
        "content/posts/hello.mdx",
        &format!("---\ntitle: Hello\ndate: 2024-01-01\n---\n{}\n", words),
    )?;
    write(
        root,
        "content/posts/wip.mdx",
        "---\ntitle: Work in progress\ndate: 2024-03-01\ndraft: true\n---\nNot yet.\n",
    )?;
    write(
        root,
        "content/pages/about.md",
        "---\ntitle: About\n---\nSee [the first post](../posts/hello.mdx).\n",
    )?;
    write(
        root,
        "content/tutorials/intro.mdx",
        "---\ntitle: Intro\ndescription: Getting started\ndate: 2024-02-01\n---\nStart here.\n",
    )?;
    write(
        root,
        "content/tutorials/intro/modules/setup.mdx",
        "---\ntitle: Setup\n---\n```sh:install.sh\ncargo install folio\n```\n",
    )?;
    write(
        root,
        "content/tutorials/intro/modules/advanced.mdx",
        "---\ntitle: Advanced\ndraft: true\n---\nLater.\n",
    )?;
    write(root, "content/README.txt", "not content")?;
    Ok(dir)
}

fn read(path: impl AsRef<Path>) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

#[test]
fn test_build_site() -> Result<()> {
    let dir = project()?;
    let config = Config::from_directory(dir.path(), None, None)?;
    let report = build_site(&config)?;

    assert_eq!(6, report.documents);
    // six detail pages plus three listings
    assert_eq!(9, report.pages.written);
    assert_eq!(0, report.pages.missing);
    assert_eq!(1, report.static_files);

    let out = &config.output_directory;
    let hello = read(out.join("posts/hello/index.html"))?;
    assert!(hello.contains("<h1>Hello</h1>"));
    assert!(hello.contains("2 min read"));

    let about = read(out.join("pages/about/index.html"))?;
    assert!(about.contains(r#"href="/posts/hello""#));

    let setup = read(out.join("tutorials/intro/modules/setup/index.html"))?;
    assert!(setup.contains(r#"<div class="code-title">install.sh</div>"#));
    assert!(setup.contains(r#"class="language-sh""#));

    // A tutorial lists its published modules.
    let intro = read(out.join("tutorials/intro/index.html"))?;
    assert!(intro.contains(r#"href="/tutorials/intro/modules/setup""#));
    assert!(!intro.contains("/tutorials/intro/modules/advanced"));

    // Drafts are rendered but never listed.
    assert!(out.join("posts/wip/index.html").is_file());
    assert!(out
        .join("tutorials/intro/modules/advanced/index.html")
        .is_file());
    let home = read(out.join("index.html"))?;
    assert!(home.contains(r#"href="/posts/hello""#));
    assert!(home.contains(r#"href="/tutorials/intro/modules/setup""#));
    assert!(!home.contains("/posts/wip"));
    let blog = read(out.join("blog/index.html"))?;
    assert!(blog.contains(r#"href="/posts/hello""#));
    assert!(!blog.contains("/posts/wip"));
    assert!(!blog.contains("/tutorials/"));
    let tutorials = read(out.join("tutorials/index.html"))?;
    assert!(tutorials.contains(r#"href="/tutorials/intro""#));

    assert!(out.join("404.html").is_file());
    assert_eq!(
        "body { margin: 0; }\n",
        read(out.join("static/style.css"))?
    );
    Ok(())
}

#[test]
fn test_rebuild_replaces_previous_output() -> Result<()> {
    let dir = project()?;
    let config = Config::from_directory(dir.path(), None, None)?;
    build_site(&config)?;

    fs::remove_file(dir.path().join("content/posts/wip.mdx"))?;
    build_site(&config)?;
    assert!(!config.output_directory.join("posts/wip").exists());
    assert!(config
        .output_directory
        .join("posts/hello/index.html")
        .is_file());
    Ok(())
}

#[test]
fn test_missing_title_fails_before_writing() -> Result<()> {
    let dir = project()?;
    write(
        dir.path(),
        "content/posts/untitled.mdx",
        "---\ndate: 2024-01-02\n---\nNo title.\n",
    )?;
    let config = Config::from_directory(dir.path(), None, None)?;
    match build_site(&config) {
        Err(BuildError::Store(err)) => assert!(err.is_validation(), "{}", err),
        other => panic!("expected a validation error, got {:?}", other),
    }
    assert!(!config.output_directory.exists());
    Ok(())
}

#[test]
fn test_malformed_front_matter_is_a_parse_error() -> Result<()> {
    let dir = project()?;
    write(
        dir.path(),
        "content/posts/broken.mdx",
        "---\ntitle: [unclosed\n---\nBody.\n",
    )?;
    let config = Config::from_directory(dir.path(), None, None)?;
    let err = Store::load(&config.content_directory, &config.load_options())
        .expect_err("malformed YAML must fail the load");
    assert!(err.is_parse(), "{}", err);
    Ok(())
}

#[test]
fn test_module_routes() -> Result<()> {
    let dir = project()?;
    let config = Config::from_directory(dir.path(), None, None)?;
    let store = Store::load(&config.content_directory, &config.load_options())?;

    let setup = store
        .documents()
        .iter()
        .find(|d| d.title() == "Setup")
        .expect("setup module is loaded");
    assert_eq!(CollectionType::Module, setup.collection());
    assert_eq!("/tutorials/intro/modules/setup", setup.slug());
    assert_eq!("intro/modules/setup", setup.slug_as_params());

    let params = RouteParams::from_document(setup)?;
    assert_eq!(
        vec![
            ("tutorial-name", "intro".to_owned()),
            ("module", "setup".to_owned())
        ],
        params.named()
    );

    let routes = enumerate_routes(&store)?;
    assert_eq!(store.len(), routes.len());
    for (document, route) in store.documents().iter().zip(&routes) {
        assert_eq!(document.slug(), route.path());
    }
    Ok(())
}
