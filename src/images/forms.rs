//! Image bookmark form validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const MAX_TITLE_LEN: usize = 200;
const VALID_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Raw form input, from the bookmarklet query string or a POST body
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImageCreateForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Validated form data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedImage {
    pub title: String,
    pub slug: String,
    pub url: String,
    pub description: Option<String>,
}

/// Field name to error messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Slug for a title; falls back to "image" when nothing slugifiable remains
pub fn slug_for(title: &str) -> String {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        "image".to_string()
    } else {
        slug.chars().take(MAX_TITLE_LEN).collect()
    }
}

/// Lower-cased file extension of a URL's path, ignoring query and fragment
fn url_extension(url: &str) -> Option<String> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let path = without_fragment.split('?').next().unwrap_or(without_fragment);
    let file_name = path.rsplit('/').next()?;
    let (_, ext) = file_name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

impl ImageCreateForm {
    pub fn validate(&self) -> Result<CleanedImage, FormErrors> {
        let mut errors = FormErrors::default();

        let title = non_blank(&self.title);
        match title {
            None => errors.add("title", "This field is required."),
            Some(t) if t.chars().count() > MAX_TITLE_LEN => errors.add(
                "title",
                format!("Ensure this value has at most {} characters.", MAX_TITLE_LEN),
            ),
            Some(_) => {}
        }

        let url = non_blank(&self.url);
        match url {
            None => errors.add("url", "This field is required."),
            Some(u) => {
                let lower = u.to_ascii_lowercase();
                if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                    errors.add("url", "Enter a valid URL.");
                } else if !url_extension(u)
                    .map(|ext| VALID_EXTENSIONS.contains(&ext.as_str()))
                    .unwrap_or(false)
                {
                    errors.add("url", "The given URL does not match valid image extensions.");
                }
            }
        }

        match (title, url) {
            (Some(title), Some(url)) if errors.is_empty() => Ok(CleanedImage {
                title: title.to_string(),
                slug: slug_for(title),
                url: url.to_string(),
                description: non_blank(&self.description).map(String::from),
            }),
            _ => Err(errors),
        }
    }
}
