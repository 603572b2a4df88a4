//! Query model: selection, filters, ordering and limit.
//!
//! The model is transport-neutral. `RestClient` renders it into PostgREST
//! query parameters and `MemoryDataClient` evaluates it in process; both must
//! agree on the semantics defined here.

use crate::table::Table;

/// Column selection with optional embedded relations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    /// Empty means every column
    pub columns: Vec<String>,
    pub embeds: Vec<Embed>,
}

impl Select {
    /// `*`
    pub fn all() -> Self {
        Self::default()
    }

    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            embeds: Vec::new(),
        }
    }

    /// Attach a related row under `embed.alias`
    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    /// PostgREST `select` value, e.g. `*,service:services(*)`
    pub fn render(&self) -> String {
        let mut parts = vec![render_columns(&self.columns)];
        parts.extend(self.embeds.iter().map(Embed::render));
        parts.join(",")
    }
}

/// A to-one relation resolved through `foreign_key` on the parent row.
#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub alias: String,
    pub table: Table,
    pub foreign_key: String,
    pub columns: Vec<String>,
}

impl Embed {
    pub fn new(alias: impl Into<String>, table: Table, foreign_key: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            table,
            foreign_key: foreign_key.into(),
            columns: Vec::new(),
        }
    }

    /// Restrict the embedded row to `columns`
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    fn render(&self) -> String {
        format!(
            "{}:{}({})",
            self.alias,
            self.table.as_str(),
            render_columns(&self.columns)
        )
    }
}

fn render_columns(columns: &[String]) -> String {
    if columns.is_empty() {
        "*".to_string()
    } else {
        columns.join(",")
    }
}

/// Row predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Column equals value, compared on textual form
    Eq { column: String, value: String },
    /// Case-insensitive LIKE with `%`/`_` wildcards and `\` escapes
    ILike { column: String, pattern: String },
    /// Any of the nested filters
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl ToString) -> Self {
        Filter::Eq {
            column: column.into(),
            value: value.to_string(),
        }
    }

    pub fn ilike(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Filter::ILike {
            column: column.into(),
            pattern: pattern.into(),
        }
    }

    /// Case-insensitive literal substring match on `column`
    pub fn contains(column: impl Into<String>, term: &str) -> Self {
        Filter::ilike(column, format!("%{}%", escape_like(term)))
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or(filters)
    }

    /// Query parameter for a top-level filter
    pub fn to_param(&self) -> (String, String) {
        match self {
            Filter::Eq { column, value } => (column.clone(), format!("eq.{}", value)),
            Filter::ILike { column, pattern } => (column.clone(), format!("ilike.{}", pattern)),
            Filter::Or(filters) => ("or".to_string(), format!("({})", render_group(filters))),
        }
    }

    /// Form used inside a logical group: `column.op.value`
    fn render_nested(&self) -> String {
        match self {
            Filter::Eq { column, value } => format!("{}.eq.{}", column, quote_reserved(value)),
            Filter::ILike { column, pattern } => {
                format!("{}.ilike.{}", column, quote_reserved(pattern))
            }
            Filter::Or(filters) => format!("or({})", render_group(filters)),
        }
    }
}

fn render_group(filters: &[Filter]) -> String {
    filters
        .iter()
        .map(Filter::render_nested)
        .collect::<Vec<_>>()
        .join(",")
}

/// Characters with meaning inside a PostgREST logical group
const RESERVED: &[char] = &[',', '.', ':', '(', ')', '"', '\\', ' '];

fn quote_reserved(value: &str) -> String {
    if !value.contains(RESERVED) {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Escape LIKE metacharacters so `term` matches literally.
///
/// PostgREST rewrites every `*` in a like pattern to `%` and offers no
/// escape for it, so `*` is dropped from the term.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars().filter(|&c| c != '*') {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

enum LikeToken {
    AnySequence,
    AnyChar,
    Literal(char),
}

fn tokenize_like(pattern: &str) -> Vec<LikeToken> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        let token = match c {
            // PostgREST accepts `*` as an alias for `%`
            '%' | '*' => LikeToken::AnySequence,
            '_' => LikeToken::AnyChar,
            '\\' => LikeToken::Literal(chars.next().unwrap_or('\\')),
            other => LikeToken::Literal(other),
        };
        tokens.push(token);
    }
    tokens
}

/// Evaluate an ILIKE pattern against `text`.
pub fn like_matches(pattern: &str, text: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let n = text.len();

    // reachable[i]: the tokens so far can consume exactly text[..i]
    let mut reachable = vec![false; n + 1];
    reachable[0] = true;

    for token in tokenize_like(&pattern.to_lowercase()) {
        let mut next = vec![false; n + 1];
        match token {
            LikeToken::AnySequence => {
                let mut seen = false;
                for i in 0..=n {
                    seen |= reachable[i];
                    next[i] = seen;
                }
            }
            LikeToken::AnyChar => {
                for i in 0..n {
                    if reachable[i] {
                        next[i + 1] = true;
                    }
                }
            }
            LikeToken::Literal(c) => {
                for i in 0..n {
                    if reachable[i] && text[i] == c {
                        next[i + 1] = true;
                    }
                }
            }
        }
        reachable = next;
    }

    reachable[n]
}

/// Single-column server-side ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }

    pub fn render(&self) -> String {
        let direction = if self.ascending { "asc" } else { "desc" };
        format!("{}.{}", self.column, direction)
    }
}

/// A read against one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub select: Select,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, select: Select) -> Self {
        self.select = select;
        self
    }

    /// Add a filter; multiple filters are combined with AND
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render every part of the query as PostgREST parameters.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.select.render())];
        params.extend(self.filters.iter().map(Filter::to_param));
        if let Some(order) = &self.order {
            params.push(("order".to_string(), order.render()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_render() {
        assert_eq!(Select::all().render(), "*");

        let select = Select::all().embed(Embed::new("service", Table::Services, "service_id"));
        assert_eq!(select.render(), "*,service:services(*)");

        let select = Select::all().embed(
            Embed::new("user", Table::Users, "user_id").columns(["name", "avatar"]),
        );
        assert_eq!(select.render(), "*,user:users(name,avatar)");
    }

    #[test]
    fn test_filter_params() {
        assert_eq!(
            Filter::eq("id", 42).to_param(),
            ("id".to_string(), "eq.42".to_string())
        );
        assert_eq!(
            Filter::contains("title", "weld").to_param(),
            ("title".to_string(), "ilike.%weld%".to_string())
        );
    }

    #[test]
    fn test_or_group_render() {
        let filter = Filter::or(vec![
            Filter::contains("title", "weld"),
            Filter::contains("category", "weld"),
        ]);
        assert_eq!(
            filter.to_param(),
            (
                "or".to_string(),
                "(title.ilike.%weld%,category.ilike.%weld%)".to_string()
            )
        );
    }

    #[test]
    fn test_or_group_quotes_reserved_values() {
        let filter = Filter::or(vec![Filter::contains("title", "a,b (c)")]);
        assert_eq!(filter.to_param().1, "(title.ilike.\"%a,b (c)%\")");
    }

    #[test]
    fn test_query_params_order() {
        let params = Query::new()
            .filter(Filter::eq("user_id", "u1"))
            .order(Order::desc("created_at"))
            .limit(20)
            .to_params();

        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("user_id".to_string(), "eq.u1".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn test_like_matches() {
        assert!(like_matches("%weld%", "Welding Services"));
        assert!(like_matches("%WELD%", "professional welding"));
        assert!(!like_matches("%weld%", "CNC Machining"));
        assert!(like_matches("c_c%", "CNC Machining"));
        assert!(like_matches("%", ""));
        assert!(!like_matches("_", ""));
    }

    #[test]
    fn test_like_matches_escaped_literal() {
        let pattern = format!("%{}%", escape_like("50%"));
        assert!(like_matches(&pattern, "save 50% today"));
        assert!(!like_matches(&pattern, "save 500 today"));
    }

    #[test]
    fn test_star_is_a_wildcard_and_dropped_from_terms() {
        assert!(like_matches("a*b", "a-long-b"));
        assert_eq!(escape_like("a*b"), "ab");

        let Filter::ILike { pattern, .. } = Filter::contains("title", "CNC*") else {
            panic!("contains builds an ilike filter");
        };
        assert_eq!(pattern, "%CNC%");
        assert!(like_matches(&pattern, "CNC Machining"));
        assert!(!like_matches(&pattern, "Laser Cutting"));
    }
}
