//! Ordered child collections with filtering.

use crate::schema::XsoType;
use crate::xso::Xso;
use ironxso_core::{LanguageRange, LanguageTag, Value, lookup_language};
use std::ops::{Deref, DerefMut};

/// An ordered sequence of child instances.
///
/// Dereferences to `Vec<Xso>` for ordinary list operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XsoList {
    items: Vec<Xso>,
}

impl XsoList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Lazily yields the items accepted by `filter`, in order.
    ///
    /// The language criterion is resolved once, against the list as it is
    /// now.
    pub fn filter<'a>(&'a self, filter: &'a XsoFilter) -> impl Iterator<Item = &'a Xso> + 'a {
        let lang = filter.resolve_lang(self);
        self.items
            .iter()
            .filter(move |item| filter.accepts(item, lang.as_ref()))
    }

    /// Copies the items accepted by `filter` into a new list.
    #[must_use]
    pub fn filtered(&self, filter: &XsoFilter) -> XsoList {
        self.filter(filter).cloned().collect()
    }

    /// Distinct languages of the items, in first-seen order.
    #[must_use]
    pub fn languages(&self) -> Vec<LanguageTag> {
        let mut langs: Vec<LanguageTag> = Vec::new();
        for lang in self.items.iter().filter_map(Xso::lang) {
            if !langs.contains(&lang) {
                langs.push(lang);
            }
        }
        langs
    }
}

impl Deref for XsoList {
    type Target = Vec<Xso>;

    fn deref(&self) -> &Vec<Xso> {
        &self.items
    }
}

impl DerefMut for XsoList {
    fn deref_mut(&mut self) -> &mut Vec<Xso> {
        &mut self.items
    }
}

impl From<Vec<Xso>> for XsoList {
    fn from(items: Vec<Xso>) -> Self {
        Self { items }
    }
}

impl FromIterator<Xso> for XsoList {
    fn from_iter<I: IntoIterator<Item = Xso>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for XsoList {
    type Item = Xso;
    type IntoIter = std::vec::IntoIter<Xso>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a XsoList {
    type Item = &'a Xso;
    type IntoIter = std::slice::Iter<'a, Xso>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Chainable selection criteria for an [`XsoList`].
///
/// All criteria must hold. An empty filter accepts every item.
#[derive(Debug, Clone, Default)]
pub struct XsoFilter {
    ty: Option<XsoType>,
    lang: Option<Vec<LanguageRange>>,
    attrs: Vec<(String, Value)>,
}

impl XsoFilter {
    /// Creates a filter accepting every item.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only instances of exactly this type.
    #[must_use]
    pub fn of_type(mut self, ty: &XsoType) -> Self {
        self.ty = Some(ty.clone());
        self
    }

    /// Keeps only the items in the single best language for the given
    /// priority list. Items without a language never match.
    #[must_use]
    pub fn lang(mut self, ranges: impl IntoIterator<Item = LanguageRange>) -> Self {
        self.lang = Some(ranges.into_iter().collect());
        self
    }

    /// Keeps only items whose field `name` reads as `value`.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    fn resolve_lang(&self, list: &XsoList) -> Option<Option<LanguageTag>> {
        let ranges = self.lang.as_ref()?;
        let available = list.languages();
        let refs: Vec<&LanguageTag> = available.iter().collect();
        Some(lookup_language(&refs, ranges).cloned())
    }

    /// `lang` is `None` without a language criterion, `Some(None)` if no
    /// language was selected.
    fn accepts(&self, item: &Xso, lang: Option<&Option<LanguageTag>>) -> bool {
        if let Some(ty) = &self.ty
            && item.xso_type() != ty
        {
            return false;
        }
        if let Some(selected) = lang {
            match (selected, item.lang()) {
                (Some(selected), Some(own)) if *selected == own => {}
                _ => return false,
            }
        }
        self.attrs
            .iter()
            .all(|(name, value)| item.get_by_name(name).is_ok_and(|v| v == *value))
    }
}

/// Walks a list by position so that edits made between steps are seen.
///
/// Unlike [`XsoList::filter`], the cursor borrows the list only while
/// stepping. Items appended behind the cursor are visited; the language
/// criterion is re-resolved on every step.
#[derive(Debug, Clone)]
pub struct FilterCursor {
    filter: XsoFilter,
    position: usize,
}

impl FilterCursor {
    /// Starts a cursor at the beginning of a list.
    #[must_use]
    pub fn new(filter: XsoFilter) -> Self {
        Self {
            filter,
            position: 0,
        }
    }

    /// Advances to the next accepted item of `list`.
    pub fn next<'a>(&mut self, list: &'a XsoList) -> Option<&'a Xso> {
        let lang = self.filter.resolve_lang(list);
        while let Some(item) = list.get(self.position) {
            self.position += 1;
            if self.filter.accepts(item, lang.as_ref()) {
                return Some(item);
            }
        }
        None
    }

    /// Index of the next item to inspect.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }
}
