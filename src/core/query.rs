//! Purpose: Model per-call store queries and translate them to wire parameters.
//! Exports: `Query`, `OrderAxis`, `Cap`.
//! Role: Pure request-construction layer used by the client before dispatch.
//! Invariants: Exactly one ordering axis per query, by construction.
//! Invariants: Caps are positive; zero caps are rejected before any round trip.
//! Invariants: A query is built immediately before dispatch and never reused.

use crate::core::error::{Error, ErrorKind};

/// The single ordering axis of a query: the record key, or a declared field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OrderAxis {
    Key,
    Field(String),
}

/// Result cap: the head of ascending order, or its tail.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cap {
    First(u32),
    Last(u32),
}

impl Cap {
    fn count(self) -> u32 {
        match self {
            Cap::First(count) | Cap::Last(count) => count,
        }
    }
}

/// A transient, request-scoped description of one store query.
#[derive(Clone, Debug)]
pub struct Query {
    order: OrderAxis,
    start_at: Option<String>,
    end_at: Option<String>,
    equal_to: Option<String>,
    cap: Option<Cap>,
}

impl Query {
    pub fn by_key() -> Self {
        Self::new(OrderAxis::Key)
    }

    pub fn by_field(name: impl Into<String>) -> Self {
        Self::new(OrderAxis::Field(name.into()))
    }

    fn new(order: OrderAxis) -> Self {
        Self {
            order,
            start_at: None,
            end_at: None,
            equal_to: None,
            cap: None,
        }
    }

    /// Closed range bounds under the store's collation. Bounds where
    /// `start_at > end_at` are dispatched as-is; the store answers with an
    /// empty result set rather than an error.
    pub fn with_range(mut self, start_at: impl Into<String>, end_at: impl Into<String>) -> Self {
        self.start_at = Some(start_at.into());
        self.end_at = Some(end_at.into());
        self
    }

    pub fn with_equal_to(mut self, value: impl Into<String>) -> Self {
        self.equal_to = Some(value.into());
        self
    }

    pub fn with_cap(mut self, cap: Cap) -> Self {
        self.cap = Some(cap);
        self
    }

    /// Rejects queries that would waste a round trip on a known-bad request.
    pub fn validate(&self) -> Result<(), Error> {
        if let OrderAxis::Field(name) = &self.order {
            if name.is_empty() {
                return Err(
                    Error::new(ErrorKind::Usage).with_message("order field must not be empty")
                );
            }
        }
        if let Some(cap) = self.cap {
            if cap.count() == 0 {
                return Err(Error::new(ErrorKind::Usage).with_message("cap must be positive"));
            }
        }
        Ok(())
    }

    /// Renders the query as wire parameters, in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let order = match &self.order {
            OrderAxis::Key => "key".to_string(),
            OrderAxis::Field(name) => format!("field:{name}"),
        };
        pairs.push(("orderBy", order));
        if let Some(start_at) = &self.start_at {
            pairs.push(("startAt", start_at.clone()));
        }
        if let Some(end_at) = &self.end_at {
            pairs.push(("endAt", end_at.clone()));
        }
        if let Some(equal_to) = &self.equal_to {
            pairs.push(("equalTo", equal_to.clone()));
        }
        match self.cap {
            Some(Cap::First(count)) => pairs.push(("limitToFirst", count.to_string())),
            Some(Cap::Last(count)) => pairs.push(("limitToLast", count.to_string())),
            None => {}
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::{Cap, Query};
    use crate::core::error::ErrorKind;

    fn rendered(query: &Query) -> Vec<(String, String)> {
        query
            .query_pairs()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    #[test]
    fn key_order_renders_bare_axis() {
        let query = Query::by_key();
        assert_eq!(rendered(&query), vec![("orderBy".into(), "key".into())]);
    }

    #[test]
    fn field_order_renders_prefixed_axis() {
        let query = Query::by_field("score").with_cap(Cap::First(100));
        assert_eq!(
            rendered(&query),
            vec![
                ("orderBy".into(), "field:score".into()),
                ("limitToFirst".into(), "100".into()),
            ]
        );
    }

    #[test]
    fn descending_cap_renders_limit_to_last() {
        let query = Query::by_field("score").with_cap(Cap::Last(2));
        assert_eq!(
            rendered(&query),
            vec![
                ("orderBy".into(), "field:score".into()),
                ("limitToLast".into(), "2".into()),
            ]
        );
    }

    #[test]
    fn range_renders_both_bounds() {
        let query = Query::by_key().with_range("user1", "user1|");
        assert_eq!(
            rendered(&query),
            vec![
                ("orderBy".into(), "key".into()),
                ("startAt".into(), "user1".into()),
                ("endAt".into(), "user1|".into()),
            ]
        );
    }

    #[test]
    fn equal_to_renders_filter() {
        let query = Query::by_field("status").with_equal_to("active");
        assert_eq!(
            rendered(&query),
            vec![
                ("orderBy".into(), "field:status".into()),
                ("equalTo".into(), "active".into()),
            ]
        );
    }

    #[test]
    fn zero_cap_is_a_usage_error() {
        let err = Query::by_field("score")
            .with_cap(Cap::First(0))
            .validate()
            .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn empty_order_field_is_a_usage_error() {
        let err = Query::by_field("").validate().expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn inverted_range_is_not_a_client_error() {
        let query = Query::by_key().with_range("b", "a");
        query.validate().expect("store decides, not the client");
    }
}
