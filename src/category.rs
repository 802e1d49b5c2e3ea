//! Category filter for resolver inputs
//!
//! Declares which categories (kinds) an input may search over and whether the
//! user can change the category at all. A single allowed kind is fixed and
//! hidden; several kinds get a selector row with an implicit "any" option.

/// Selectable categories for one resolver input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    /// Allowed kinds in display order; `None` means every category
    kinds: Option<Vec<String>>,
}

impl CategoryFilter {
    pub fn new(kinds: Option<Vec<String>>) -> Self {
        Self { kinds }
    }

    /// Filter that accepts every category
    pub fn any() -> Self {
        Self { kinds: None }
    }

    /// Filter pinned to exactly one category
    pub fn fixed(kind: impl Into<String>) -> Self {
        Self {
            kinds: Some(vec![kind.into()]),
        }
    }

    pub fn kinds(&self) -> Option<&[String]> {
        self.kinds.as_deref()
    }

    /// True when exactly one category is allowed
    pub fn is_category_fixed(&self) -> bool {
        matches!(&self.kinds, Some(kinds) if kinds.len() == 1)
    }

    /// Allowed categories, `None` standing for the "any" pseudo-category.
    ///
    /// "Any" comes first and is present when kinds are omitted or when more
    /// than one kind is allowed.
    pub fn allowed_categories(&self) -> Vec<Option<String>> {
        match &self.kinds {
            None => vec![None],
            Some(kinds) if kinds.len() == 1 => vec![Some(kinds[0].clone())],
            Some(kinds) => std::iter::once(None)
                .chain(kinds.iter().cloned().map(Some))
                .collect(),
        }
    }

    /// Whether `category` may become the active category
    pub fn allows(&self, category: Option<&str>) -> bool {
        match &self.kinds {
            None => true,
            Some(kinds) if kinds.len() == 1 => category == Some(kinds[0].as_str()),
            Some(kinds) => match category {
                None => true,
                Some(cat) => kinds.iter().any(|k| k == cat),
            },
        }
    }

    /// Category active right after construction
    pub fn initial_category(&self) -> Option<String> {
        match &self.kinds {
            Some(kinds) if kinds.len() == 1 => Some(kinds[0].clone()),
            _ => None,
        }
    }

    /// Options for the selector row; empty when there is nothing to choose
    pub fn selector_options(&self) -> Vec<Option<String>> {
        match &self.kinds {
            Some(kinds) if kinds.len() > 1 => self.allowed_categories(),
            _ => Vec::new(),
        }
    }
}
