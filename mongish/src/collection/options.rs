use crate::collection::FindOptions;
use crate::reference::ReferenceSpec;
use indexmap::IndexMap;

/// Fields eligible for retry-with-suffix when a write hits a unique index.
///
/// ```rust,ignore
/// let force = ForceFields::new().field("primaryEmail");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForceFields {
    fields: IndexMap<String, bool>,
}

impl ForceFields {
    pub fn new() -> Self {
        ForceFields::default()
    }

    pub fn field(self, name: &str) -> Self {
        self.set(name, true)
    }

    /// Sets the flag for `name`; a `false` entry never enables a retry.
    pub fn set(mut self, name: &str, enabled: bool) -> Self {
        self.fields.insert(name.to_string(), enabled);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.get(name).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        !self.fields.values().any(|enabled| *enabled)
    }

    /// Enabled field names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.fields.iter().filter(|(_, enabled)| **enabled).map(|(name, _)| name)
    }
}

impl<'a> FromIterator<&'a str> for ForceFields {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().fold(ForceFields::new(), |force, name| force.field(name))
    }
}

/// Options for [crate::collection::MongishCollection::create].
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub(crate) inflate: Option<ReferenceSpec>,
    pub(crate) force: ForceFields,
}

impl CreateOptions {
    pub fn new() -> Self {
        CreateOptions::default()
    }

    /// Inflates the inserted document with `spec` before returning it.
    pub fn inflate(mut self, spec: ReferenceSpec) -> Self {
        self.inflate = Some(spec);
        self
    }

    pub fn force(mut self, force: ForceFields) -> Self {
        self.force = force;
        self
    }
}

/// Options for [crate::collection::MongishCollection::update].
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub(crate) force: ForceFields,
}

impl UpdateOptions {
    pub fn new() -> Self {
        UpdateOptions::default()
    }

    pub fn force(mut self, force: ForceFields) -> Self {
        self.force = force;
        self
    }
}

/// Options for [crate::collection::MongishCollection::read].
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    pub(crate) inflate: Option<ReferenceSpec>,
    pub(crate) inc: bool,
}

impl ReadOptions {
    pub fn new() -> Self {
        ReadOptions::default()
    }

    pub fn inflate(mut self, spec: ReferenceSpec) -> Self {
        self.inflate = Some(spec);
        self
    }

    /// Bumps the view count of the matched document in the background.
    pub fn inc(mut self, inc: bool) -> Self {
        self.inc = inc;
        self
    }
}

/// Options for [crate::collection::MongishCollection::list].
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub(crate) find: FindOptions,
    pub(crate) inflate: Option<ReferenceSpec>,
    pub(crate) inc: bool,
}

impl ListOptions {
    pub fn new() -> Self {
        ListOptions::default()
    }

    /// Sort and pagination passed to the store.
    pub fn find(mut self, find: FindOptions) -> Self {
        self.find = find;
        self
    }

    /// Inflates every listed document; documents left with a `missing`
    /// marker are dropped from the result.
    pub fn inflate(mut self, spec: ReferenceSpec) -> Self {
        self.inflate = Some(spec);
        self
    }

    pub fn inc(mut self, inc: bool) -> Self {
        self.inc = inc;
        self
    }
}

/// Options for the reverse-relation fill.
#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    pub(crate) reverse: bool,
    pub(crate) list: ListOptions,
}

impl FillOptions {
    pub fn new() -> Self {
        FillOptions::default()
    }

    /// Reverses the attached list.
    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Options handed verbatim to the list query of every owner.
    pub fn list(mut self, list: ListOptions) -> Self {
        self.list = list;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_fields() {
        let force = ForceFields::new().field("primaryEmail").set("username", false);
        assert!(force.contains("primaryEmail"));
        assert!(!force.contains("username"));
        assert!(!force.contains("other"));
        assert_eq!(force.names().collect::<Vec<_>>(), vec!["primaryEmail"]);
        assert!(!force.is_empty());
    }

    #[test]
    fn test_force_fields_all_disabled_is_empty() {
        assert!(ForceFields::new().set("a", false).is_empty());
        assert!(ForceFields::new().is_empty());
    }

    #[test]
    fn test_force_fields_from_iter() {
        let force: ForceFields = ["a", "b"].into_iter().collect();
        assert!(force.contains("a") && force.contains("b"));
    }

    #[test]
    fn test_fill_options_wrap_list_options() {
        let options = FillOptions::new().reverse(true).list(ListOptions::new().inc(true));
        assert!(options.reverse);
        assert!(options.list.inc);
        assert!(options.list.inflate.is_none());
    }
}
