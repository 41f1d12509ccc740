use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// PostgREST read request: `select`, column filters, `order` and `limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    columns: String,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<usize>,
}

impl Default for Select {
    fn default() -> Self {
        Self::columns("*")
    }
}

impl Select {
    pub fn columns(columns: impl Into<String>) -> Self {
        Self {
            columns: columns.into(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.filters.push((column.to_string(), format!("eq.{value}")));
        self
    }

    /// Case-insensitive substring match.
    pub fn ilike(mut self, column: &str, needle: &str) -> Self {
        self.filters
            .push((column.to_string(), format!("ilike.*{}*", needle.replace('*', ""))));
        self
    }

    /// Array column contains every one of `values`.
    pub fn contains<S: AsRef<str>>(mut self, column: &str, values: &[S]) -> Self {
        let quoted: Vec<String> = values.iter().map(|v| quote(v.as_ref())).collect();
        self.filters
            .push((column.to_string(), format!("cs.{{{}}}", quoted.join(","))));
        self
    }

    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        let dir = match direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        self.order.push(format!("{column}.{dir}"));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.columns.clone())];
        pairs.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            pairs.push(("order".to_string(), self.order.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }

    /// Only the row filters; for deletes, which take no `select`.
    pub fn to_filter_query(&self) -> Vec<(String, String)> {
        self.filters.clone()
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
