use crate::query::SelectBuilder;
use crate::transpiler::ToSql;

const ROW_COUNT_COLUMN: &str = "COUNT(*) OVER() AS TotalRowCount";
const RECOMPILE_HINT: &str = "OPTION (RECOMPILE)";

impl SelectBuilder {
    /// Clause order is fixed; call order only decides the content of each clause.
    pub(crate) fn render(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        if !self.ctes.is_empty() {
            let ctes: Vec<String> = self
                .ctes
                .iter()
                .map(|cte| format!("{} AS ({})", cte.name, cte.query))
                .collect();
            lines.push(format!("WITH {}", ctes.join(", ")));
        }

        lines.push(self.render_select());
        lines.extend(self.sources.iter().map(ToString::to_string));

        if let Some(filter) = self.render_where() {
            lines.push(filter);
        }
        lines.extend(self.grouping.iter().map(ToString::to_string));

        if !self.order.is_empty() {
            let items: Vec<String> = self.order.iter().map(ToString::to_string).collect();
            lines.push(format!("ORDER BY {}", items.join(", ")));
        }

        if let Some(page) = &self.pagination {
            if self.options.recompile_hint {
                lines.push(format!("{} {}", page, RECOMPILE_HINT));
            } else {
                lines.push(page.to_string());
            }
        }

        let sql = lines.join("\n");
        tracing::debug!("Rendered statement ({} parameters):\n{}", self.params.len(), sql);
        sql
    }

    fn render_select(&self) -> String {
        let mut items = if self.columns.is_empty() {
            vec!["*".to_string()]
        } else {
            self.columns.clone()
        };
        if self.include_row_count {
            items.push(ROW_COUNT_COLUMN.to_string());
        }
        format!("SELECT {}", items.join(", "))
    }

    fn render_where(&self) -> Option<String> {
        let (first, rest) = self.conditions.split_first()?;
        let mut sql = String::from("WHERE ");
        if let Some(leading) = first.combinator.leading() {
            sql.push_str(leading);
            sql.push(' ');
        }
        sql.push_str(&first.body());
        for condition in rest {
            sql.push(' ');
            sql.push_str(condition.combinator.joiner());
            sql.push(' ');
            sql.push_str(&condition.body());
        }
        Some(sql)
    }
}

impl ToSql for SelectBuilder {
    fn to_sql(&self) -> String {
        self.render()
    }
}
