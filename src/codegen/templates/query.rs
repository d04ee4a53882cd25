//! `<entity>_query.rs`: chainable SELECT builder for one table

use std::fmt::Write;

use super::helpers::{column_list, str_lit};
use crate::codegen::{RenderError, TemplatePayload};

const ORDER_ENUM: &str = r#"/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_sql(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}
"#;

const BUILDER_FIELDS: &str = r#"    filters: Vec<(&'static str, &'static str)>,
    order: Vec<(&'static str, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
"#;

const COMMON_METHODS: &str = r#"    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Number of positional parameters `to_sql` expects
    pub fn param_count(&self) -> usize {
        self.filters.iter().filter(|(_, op)| op.ends_with('?')).count()
    }

    pub fn to_sql(&self) -> String {
        let mut sql = String::from(Self::SELECT);
        let mut param = 0;
        for (i, (column, op)) in self.filters.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(column);
            sql.push(' ');
            match op.strip_suffix('?') {
                Some(cmp) => {
                    param += 1;
                    sql.push_str(cmp);
                    sql.push('$');
                    sql.push_str(&param.to_string());
                }
                None => sql.push_str(op),
            }
        }
        for (i, (column, order)) in self.order.iter().enumerate() {
            sql.push_str(if i == 0 { " ORDER BY " } else { ", " });
            sql.push_str(column);
            sql.push(' ');
            sql.push_str(order.as_sql());
        }
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit.to_string());
        }
        if let Some(offset) = self.offset {
            sql.push_str(" OFFSET ");
            sql.push_str(&offset.to_string());
        }
        sql
    }
"#;

pub(super) fn write_query(
    out: &mut String,
    payload: &TemplatePayload<'_>,
) -> Result<(), RenderError> {
    let entity = payload.entity()?;
    let type_name = format!("{}Query", payload.helper("pascal", &entity.name)?);
    let select = format!("SELECT {} FROM {}", column_list(entity), entity.table_name);

    writeln!(out, "//! Query builder for `{}` ({}).", entity.table_name, entity.name)?;
    writeln!(out)?;
    out.push_str(ORDER_ENUM);
    writeln!(out)?;
    writeln!(
        out,
        "/// SELECT over `{}`. Each `where_*_eq`/`where_*_ne` call adds one positional parameter.",
        entity.table_name
    )?;
    writeln!(out, "#[derive(Debug, Clone, Default)]")?;
    writeln!(out, "pub struct {} {{", type_name)?;
    out.push_str(BUILDER_FIELDS);
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "impl {} {{", type_name)?;
    writeln!(out, "    pub const TABLE: &'static str = {};", str_lit(&entity.table_name))?;
    writeln!(out, "    const SELECT: &'static str = {};", str_lit(&select))?;
    writeln!(out)?;
    out.push_str(COMMON_METHODS);

    for column in &entity.columns {
        let method = payload.helper("snake", &column.column_name)?;
        let name = str_lit(&column.column_name);

        write_filter(out, &format!("where_{}_eq", method), &name, "= ?")?;
        write_filter(out, &format!("where_{}_ne", method), &name, "<> ?")?;
        if column.is_nullable {
            write_filter(out, &format!("where_{}_is_null", method), &name, "IS NULL")?;
            write_filter(out, &format!("where_{}_is_not_null", method), &name, "IS NOT NULL")?;
        }

        writeln!(out)?;
        writeln!(out, "    pub fn order_by_{}(mut self, order: Order) -> Self {{", method)?;
        writeln!(out, "        self.order.push(({}, order));", name)?;
        writeln!(out, "        self")?;
        writeln!(out, "    }}")?;
    }

    writeln!(out, "}}")?;
    Ok(())
}

fn write_filter(out: &mut String, method: &str, column: &str, op: &str) -> Result<(), RenderError> {
    writeln!(out)?;
    writeln!(out, "    pub fn {}(mut self) -> Self {{", method)?;
    writeln!(out, "        self.filters.push(({}, {}));", column, str_lit(op))?;
    writeln!(out, "        self")?;
    writeln!(out, "    }}")?;
    Ok(())
}
