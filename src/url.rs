//! Rewrites link targets found in document bodies. Links to other content
//! files (`../posts/other.mdx`) become the target document's slug
//! (`/posts/other`); everything else is resolved against the site root.

use url::{ParseError, Url};

use crate::path::MARKDOWN_EXTENSIONS;

pub struct Converter<'a> {
    site_root: &'a Url,
    base: Url,
}

impl<'a> Converter<'a> {
    /// Constructs a new `Converter`
    ///
    /// # Arguments
    ///
    /// * `site_root` - the URL of the content root. This should end in a
    ///   trailing slash.
    /// * `raw_path` - the path of the source document relative to the content
    ///   root. Relative links are resolved against it.
    pub fn new(site_root: &'a Url, raw_path: &str) -> Result<Converter<'a>> {
        Ok(Converter {
            site_root,
            base: site_root.join(raw_path)?,
        })
    }

    fn strip_markdown_extension(relative: &str) -> Option<&str> {
        MARKDOWN_EXTENSIONS.iter().find_map(|ext| {
            relative
                .strip_suffix(ext)
                .and_then(|stem| stem.strip_suffix('.'))
        })
    }

    fn convert_absolute(&self, mut absolute: Url) -> String {
        let fragment = absolute.fragment().map(str::to_owned);
        absolute.set_fragment(None);
        if let Some(relative) = self.site_root.make_relative(&absolute) {
            if !relative.starts_with("../") && absolute.query().is_none() {
                if let Some(stem) = Self::strip_markdown_extension(&relative) {
                    return match fragment {
                        Some(fragment) => format!("/{}#{}", stem, fragment),
                        None => format!("/{}", stem),
                    };
                }
            }
        }
        absolute.set_fragment(fragment.as_deref());
        absolute.to_string()
    }

    pub fn convert(&self, url: &str) -> Result<String> {
        // in-page anchors stay relative to the rendered page
        if url.starts_with('#') {
            return Ok(url.to_owned());
        }
        match Url::parse(url) {
            Ok(absolute) => Ok(self.convert_absolute(absolute)),
            Err(ParseError::RelativeUrlWithoutBase) => {
                Ok(self.convert_absolute(self.base.join(url)?))
            }
            Err(e) => Err(e),
        }
    }
}

type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_convert_relative_post() -> Result<()> {
        fixture_basic("/posts/relative", "relative.mdx")
    }

    #[test]
    fn test_convert_relative_post_leading_dotslash() -> Result<()> {
        fixture_basic("/posts/relative", "./relative.md")
    }

    #[test]
    fn test_convert_cross_collection() -> Result<()> {
        fixture_basic(
            "/tutorials/intro/modules/setup",
            "../tutorials/intro/modules/setup.mdx",
        )
    }

    #[test]
    fn test_convert_keeps_fragment() -> Result<()> {
        fixture_basic("/posts/relative#usage", "relative.mdx#usage")
    }

    #[test]
    fn test_convert_anchor() -> Result<()> {
        fixture_basic("#usage", "#usage")
    }

    #[test]
    fn test_convert_relative_asset() -> Result<()> {
        fixture_basic("https://example.org/posts/relative.jpg", "relative.jpg")
    }

    #[test]
    fn test_convert_relative_asset_redundancies() -> Result<()> {
        fixture_basic(
            "https://example.org/posts/relative.jpg",
            "../posts/./relative.jpg",
        )
    }

    #[test]
    fn test_convert_absolute_post() -> Result<()> {
        fixture_basic("/posts/absolute", "https://example.org/posts/absolute.mdx")
    }

    #[test]
    fn test_convert_remote_markdown() -> Result<()> {
        fixture_basic(
            "https://remote.org/absolute.md",
            "https://remote.org/absolute.md",
        )
    }

    #[test]
    fn test_convert_mailto() -> Result<()> {
        fixture_basic("mailto:me@example.org", "mailto:me@example.org")
    }

    fn fixture_basic(wanted: &str, target: &str) -> Result<()> {
        fixture("posts/hello.mdx", wanted, target)
    }

    fn fixture(raw_path: &str, wanted: &str, target: &str) -> Result<()> {
        assert_eq!(
            wanted,
            Converter::new(&Url::parse("https://example.org/")?, raw_path)?.convert(target)?,
        );
        Ok(())
    }
}
