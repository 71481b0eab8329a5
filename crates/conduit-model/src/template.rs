/// Placeholder syntax of a target driver, used to render an [`InsertTemplate`]
/// into an executable statement string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    MySql,
}

/// A parameterized `INSERT INTO <table>(c1,...,ck) VALUES (...)` statement.
///
/// Exactly one is produced per job, derived from the source cursor's column
/// names in declaration order, and is immutable once published by the
/// Extractor via `Coordinator::set_insert_template`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertTemplate {
    pub table: String,
    pub columns: Vec<String>,
}

impl InsertTemplate {
    pub fn new(table: impl Into<String>, columns: Vec<String>) -> Self {
        InsertTemplate {
            table: table.into(),
            columns,
        }
    }

    /// Number of parameters expected per row.
    pub fn arity(&self) -> usize {
        self.columns.len()
    }

    /// Render a single-row `VALUES` placeholder statement for this dialect.
    ///
    /// Connectors that can batch natively (MySQL's `exec_batch`) only need
    /// the single-row form; connectors that must inline every row into one
    /// statement (Postgres multi-row `VALUES`) use [`Self::render_multi_row`].
    pub fn render(&self, dialect: Dialect) -> String {
        let cols = self.columns.join(", ");
        let placeholders = match dialect {
            Dialect::Postgres => (1..=self.arity())
                .map(|i| format!("${i}"))
                .collect::<Vec<_>>()
                .join(", "),
            Dialect::MySql => vec!["?"; self.arity()].join(", "),
        };
        format!("INSERT INTO {}({cols}) VALUES ({placeholders})", self.table)
    }

    /// Render a multi-row `VALUES` statement covering `row_count` rows, with
    /// Postgres-style `$n` placeholders numbered consecutively across rows.
    pub fn render_multi_row_postgres(&self, row_count: usize) -> String {
        let cols = self.columns.join(", ");
        let arity = self.arity();
        let mut param = 1usize;
        let rows = (0..row_count)
            .map(|_| {
                let placeholders = (0..arity)
                    .map(|_| {
                        let p = format!("${param}");
                        param += 1;
                        p
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({placeholders})")
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("INSERT INTO {}({cols}) VALUES {rows}", self.table)
    }
}
