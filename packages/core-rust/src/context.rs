use std::collections::HashMap;

use http::Extensions;

use crate::types::RequestId;

/// Request-scoped key/value store for resolved identifiers.
///
/// Lives inside the request's [`Extensions`], so it is dropped together with
/// the request and never shared between requests. [`RequestScope::clear`]
/// tears it down early for callers that keep the request alive past the
/// point where the identifier is needed.
#[derive(Debug, Clone, Default)]
pub struct RequestScope {
    values: HashMap<String, RequestId>,
}

impl RequestScope {
    /// Returns the scope attached to `extensions`, creating an empty one if missing.
    pub fn get_or_insert(extensions: &mut Extensions) -> &mut Self {
        extensions.get_or_insert_default::<Self>()
    }

    /// Reads the identifier stored under `key`, if any.
    #[must_use]
    pub fn id<'a>(extensions: &'a Extensions, key: &str) -> Option<&'a RequestId> {
        extensions.get::<Self>()?.values.get(key)
    }

    /// Removes the scope from `extensions`, returning it if one was attached.
    pub fn clear(extensions: &mut Extensions) -> Option<Self> {
        extensions.remove::<Self>()
    }

    pub fn set(&mut self, key: impl Into<String>, id: RequestId) {
        self.values.insert(key.into(), id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_is_created_on_first_use() {
        let mut extensions = Extensions::new();
        assert!(RequestScope::id(&extensions, "request_id").is_none());

        RequestScope::get_or_insert(&mut extensions).set("request_id", RequestId::from("abc"));
        assert_eq!(
            RequestScope::id(&extensions, "request_id"),
            Some(&RequestId::from("abc"))
        );
    }

    #[test]
    fn keys_are_independent() {
        let mut extensions = Extensions::new();
        let scope = RequestScope::get_or_insert(&mut extensions);
        scope.set("a", RequestId::from("1"));
        scope.set("b", RequestId::from("2"));
        assert_eq!(scope.values.len(), 2);
        assert_eq!(
            RequestScope::id(&extensions, "a").map(RequestId::as_str),
            Some("1")
        );
        assert_eq!(
            RequestScope::id(&extensions, "b").map(RequestId::as_str),
            Some("2")
        );
    }

    #[test]
    fn set_overwrites_existing_key() {
        let mut extensions = Extensions::new();
        RequestScope::get_or_insert(&mut extensions).set("k", RequestId::from("old"));
        RequestScope::get_or_insert(&mut extensions).set("k", RequestId::from("new"));
        assert_eq!(
            RequestScope::id(&extensions, "k").map(RequestId::as_str),
            Some("new")
        );
    }

    #[test]
    fn clear_detaches_scope() {
        let mut extensions = Extensions::new();
        RequestScope::get_or_insert(&mut extensions).set("k", RequestId::from("v"));

        let removed = RequestScope::clear(&mut extensions).unwrap();
        assert_eq!(removed.values.len(), 1);
        assert!(RequestScope::id(&extensions, "k").is_none());
        assert!(RequestScope::clear(&mut extensions).is_none());
    }
}
