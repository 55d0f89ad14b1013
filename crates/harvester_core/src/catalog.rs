use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Testament {
    Old,
    New,
}

impl Testament {
    pub fn as_str(self) -> &'static str {
        match self {
            Testament::Old => "ot",
            Testament::New => "nt",
        }
    }
}

/// One work as listed by a catalog, before short-code resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    pub slug: String,
    pub sections: u32,
    #[serde(default)]
    pub testament: Option<Testament>,
}

impl CatalogEntry {
    pub fn new(title: impl Into<String>, slug: impl Into<String>, sections: u32) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            sections,
            testament: None,
        }
    }

    pub fn in_testament(mut self, testament: Testament) -> Self {
        self.testament = Some(testament);
        self
    }
}

/// Ordered list of works to harvest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entries belonging to `testament`; entries without one always match.
    pub fn filtered(&self, testament: Option<Testament>) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |entry| match (testament, entry.testament) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testament_filter_keeps_untagged_entries() {
        let catalog = Catalog::new(vec![
            CatalogEntry::new("Gênesis", "genesis", 50).in_testament(Testament::Old),
            CatalogEntry::new("Mateus", "mateus", 28).in_testament(Testament::New),
            CatalogEntry::new("Pastor de Hermas", "pastor-hermas", 114),
        ]);
        let slugs: Vec<_> = catalog
            .filtered(Some(Testament::New))
            .map(|e| e.slug.as_str())
            .collect();
        assert_eq!(slugs, vec!["mateus", "pastor-hermas"]);
        assert_eq!(catalog.filtered(None).count(), 3);
    }
}
