//! Per-source request templates.
//!
//! Templates may use `{version}`, `{work}`, `{section}` and `{testament}`;
//! POST form fields are rendered with the same placeholders.

use harvester_core::{SectionLocator, Testament};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::FetchRequest;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

/// How a source spells each testament in its requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestamentValues {
    pub old: String,
    pub new: String,
}

impl Default for TestamentValues {
    fn default() -> Self {
        Self {
            old: Testament::Old.as_str().to_string(),
            new: Testament::New.as_str().to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("template uses {{testament}} but {work:?} has no testament")]
    MissingTestament { work: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub method: HttpMethod,
    pub url: String,
    #[serde(default)]
    pub form: Vec<(String, String)>,
    #[serde(default)]
    pub testament_values: TestamentValues,
}

impl Endpoint {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            form: Vec::new(),
            testament_values: TestamentValues::default(),
        }
    }

    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            form,
            testament_values: TestamentValues::default(),
        }
    }

    pub fn request(&self, locator: &SectionLocator) -> Result<FetchRequest, EndpointError> {
        let url = self.render(&self.url, locator)?;
        match self.method {
            HttpMethod::Get => Ok(FetchRequest::Get { url }),
            HttpMethod::Post => {
                let form = self
                    .form
                    .iter()
                    .map(|(name, value)| Ok((name.clone(), self.render(value, locator)?)))
                    .collect::<Result<_, EndpointError>>()?;
                Ok(FetchRequest::PostForm { url, form })
            }
        }
    }

    fn render(&self, template: &str, locator: &SectionLocator) -> Result<String, EndpointError> {
        let mut out = template
            .replace("{version}", &locator.version)
            .replace("{work}", &locator.work_id)
            .replace("{section}", &locator.section.to_string());
        if out.contains("{testament}") {
            let value = match locator.testament {
                Some(Testament::Old) => &self.testament_values.old,
                Some(Testament::New) => &self.testament_values.new,
                None => {
                    return Err(EndpointError::MissingTestament {
                        work: locator.work_id.clone(),
                    })
                }
            };
            out = out.replace("{testament}", value);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator(testament: Option<Testament>) -> SectionLocator {
        SectionLocator {
            version: "acf".into(),
            work_id: "gn".into(),
            section: 12,
            testament,
        }
    }

    #[test]
    fn get_template_substitutes_every_placeholder() {
        let endpoint = Endpoint::get("https://example.com/{version}/{work}/{section}");
        assert_eq!(
            endpoint.request(&locator(None)).unwrap(),
            FetchRequest::get("https://example.com/acf/gn/12")
        );
    }

    #[test]
    fn post_form_renders_fields() {
        let mut endpoint = Endpoint::post_form(
            "https://example.com/get_versicles",
            vec![
                ("new_testament_slug".into(), "{testament}".into()),
                ("book_slug".into(), "{work}".into()),
                ("chapter_order".into(), "{section}".into()),
            ],
        );
        endpoint.testament_values = TestamentValues {
            old: "antigo-testamento".into(),
            new: "novo-testamento".into(),
        };
        let request = endpoint.request(&locator(Some(Testament::Old))).unwrap();
        assert_eq!(
            request,
            FetchRequest::PostForm {
                url: "https://example.com/get_versicles".into(),
                form: vec![
                    ("new_testament_slug".into(), "antigo-testamento".into()),
                    ("book_slug".into(), "gn".into()),
                    ("chapter_order".into(), "12".into()),
                ],
            }
        );
    }

    #[test]
    fn testament_placeholder_requires_a_testament() {
        let endpoint = Endpoint::get("https://example.com/{testament}/{work}");
        assert_eq!(
            endpoint.request(&locator(None)),
            Err(EndpointError::MissingTestament { work: "gn".into() })
        );
    }
}
