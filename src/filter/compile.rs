//! Predicate compiler - filter AST to SQL predicate text plus parameters
//!
//! Compilation resolves every path against the schema registry before any
//! SQL is produced, so unknown names, wrong-typed values and over-deep
//! traversals all fail with InvalidArgument and never reach the engine.
//! The emitted predicate references the outer query's `r` alias
//! (`resources r`) and scopes every traversed edge target to the same
//! tenant, so a compiled filter can never cross the tenant boundary.

use super::ast::{FilterExpr, Literal, Path};
use super::{DEFAULT_PAGE_SIZE, MAX_EDGE_HOPS, MAX_PAGE_SIZE};
use crate::kind::ResourceKind;
use crate::schema::{self, encode_uint, FieldDef, FieldType, KindSchema};
use crate::{Error, Result};

/// A compiled predicate: SQL text over alias `r` plus bound parameters in
/// textual order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlPredicate {
    pub sql: String,
    pub params: Vec<String>,
}

/// Compile a parsed filter against a kind's schema
pub fn compile(kind: ResourceKind, expr: &FilterExpr) -> Result<SqlPredicate> {
    let mut compiler = Compiler {
        kind,
        params: Vec::new(),
        alias_seq: 0,
    };
    let sql = compiler.expr(schema::schema_for(kind), "r", expr)?;
    Ok(SqlPredicate {
        sql,
        params: compiler.params,
    })
}

struct Compiler {
    kind: ResourceKind,
    params: Vec<String>,
    alias_seq: usize,
}

impl Compiler {
    fn expr(&mut self, schema: &'static KindSchema, alias: &str, expr: &FilterExpr) -> Result<String> {
        match expr {
            FilterExpr::And(clauses) => {
                let mut parts = Vec::with_capacity(clauses.len());
                for clause in clauses {
                    parts.push(self.expr(schema, alias, clause)?);
                }
                Ok(format!("({})", parts.join(" AND ")))
            }
            FilterExpr::Not(inner) => {
                let sub = self.expr(schema, alias, inner)?;
                Ok(format!("NOT {}", sub))
            }
            FilterExpr::Has(path) => {
                if path.segments().len() > MAX_EDGE_HOPS {
                    return Err(self.too_deep(path));
                }
                self.has(schema, alias, path.segments(), path)
            }
            FilterExpr::Eq(path, literal) => {
                if path.segments().len().saturating_sub(1) > MAX_EDGE_HOPS {
                    return Err(self.too_deep(path));
                }
                self.eq(schema, alias, path.segments(), path, literal)
            }
        }
    }

    fn eq(
        &mut self,
        schema: &'static KindSchema,
        alias: &str,
        segments: &[String],
        full_path: &Path,
        literal: &Literal,
    ) -> Result<String> {
        if segments.len() == 1 {
            let name = segments[0].as_str();
            let Some(fdef) = schema.field(name) else {
                if schema.edge(name).is_some() {
                    return Err(Error::invalid(
                        self.kind,
                        format!("path {} ends on an edge; use has()", full_path.display()),
                    ));
                }
                return Err(self.unknown(schema, full_path, name));
            };
            return self.field_predicate(alias, fdef, literal);
        }

        let (edge_schema, inner_alias, prefix) =
            self.traverse(schema, alias, &segments[0], full_path)?;
        let inner = self.eq(edge_schema, &inner_alias, &segments[1..], full_path, literal)?;
        Ok(format!("{} AND {})", prefix, inner))
    }

    fn has(
        &mut self,
        schema: &'static KindSchema,
        alias: &str,
        segments: &[String],
        full_path: &Path,
    ) -> Result<String> {
        let name = segments[0].as_str();
        if segments.len() == 1 {
            let Some(edef) = schema.edge(name) else {
                if schema.field(name).is_some() {
                    return Err(Error::invalid(
                        self.kind,
                        format!("has() requires an edge, {} is a field", name),
                    ));
                }
                return Err(self.unknown(schema, full_path, name));
            };
            let g = self.next_alias("g");
            self.params.push(edef.name.to_string());
            return Ok(format!(
                "EXISTS (SELECT 1 FROM resource_edges {g} WHERE {g}.from_id = {a}.id AND {g}.edge = ?)",
                g = g,
                a = alias,
            ));
        }

        let (edge_schema, inner_alias, prefix) = self.traverse(schema, alias, name, full_path)?;
        let inner = self.has(edge_schema, &inner_alias, &segments[1..], full_path)?;
        Ok(format!("{} AND {})", prefix, inner))
    }

    /// One edge hop: emits the opening of a nested EXISTS join and returns
    /// the target kind's schema plus the alias the caller continues under.
    /// The returned fragment is closed by the caller (`... AND <inner>)`).
    fn traverse(
        &mut self,
        schema: &'static KindSchema,
        alias: &str,
        segment: &str,
        full_path: &Path,
    ) -> Result<(&'static KindSchema, String, String)> {
        let Some(edef) = schema.edge(segment) else {
            if schema.field(segment).is_some() {
                return Err(Error::invalid(
                    self.kind,
                    format!(
                        "path {}: {} is a field, not a traversable edge",
                        full_path.display(),
                        segment
                    ),
                ));
            }
            return Err(self.unknown(schema, full_path, segment));
        };

        let g = self.next_alias("g");
        let r = self.next_alias("t");
        self.params.push(edef.name.to_string());
        let prefix = format!(
            "EXISTS (SELECT 1 FROM resource_edges {g} \
             JOIN resources {r} ON {r}.id = {g}.to_id AND {r}.tenant_id = {a}.tenant_id \
             WHERE {g}.from_id = {a}.id AND {g}.edge = ?",
            g = g,
            r = r,
            a = alias,
        );
        Ok((schema::schema_for(edef.target), r, prefix))
    }

    fn field_predicate(&mut self, alias: &str, fdef: &FieldDef, literal: &Literal) -> Result<String> {
        let text = literal.text();

        // Empty-string equality matches absent-or-empty, so tombstoned and
        // never-set fields behave the same under `field = ""`.
        if text.is_empty() {
            if !matches!(
                fdef.ftype,
                FieldType::Str | FieldType::StrSet | FieldType::PairSet
            ) {
                return Err(Error::invalid(
                    self.kind,
                    format!("field {} cannot be compared to \"\"", fdef.name),
                ));
            }
            let f = self.next_alias("f");
            self.params.push(fdef.name.to_string());
            return Ok(format!(
                "NOT EXISTS (SELECT 1 FROM resource_fields {f} \
                 WHERE {f}.resource_id = {a}.id AND {f}.field = ? AND {f}.value <> '')",
                f = f,
                a = alias,
            ));
        }

        let encoded = match fdef.ftype {
            FieldType::Str | FieldType::StrSet | FieldType::PairSet => text.to_string(),
            FieldType::Enum => {
                if !fdef.enum_values.contains(&text) {
                    return Err(Error::invalid(
                        self.kind,
                        format!("invalid value {} for enum field {}", text, fdef.name),
                    ));
                }
                text.to_string()
            }
            FieldType::Uint => {
                let n: u64 = text.parse().map_err(|_| {
                    Error::invalid(
                        self.kind,
                        format!("field {} expects an unsigned integer, got {}", fdef.name, text),
                    )
                })?;
                encode_uint(n)
            }
            FieldType::Bool => match text {
                "true" | "false" => text.to_string(),
                _ => {
                    return Err(Error::invalid(
                        self.kind,
                        format!("field {} expects true or false, got {}", fdef.name, text),
                    ));
                }
            },
        };

        let f = self.next_alias("f");
        self.params.push(fdef.name.to_string());
        self.params.push(encoded);
        Ok(format!(
            "EXISTS (SELECT 1 FROM resource_fields {f} \
             WHERE {f}.resource_id = {a}.id AND {f}.field = ? AND {f}.value = ?)",
            f = f,
            a = alias,
        ))
    }

    fn next_alias(&mut self, prefix: &str) -> String {
        let alias = format!("{}{}", prefix, self.alias_seq);
        self.alias_seq += 1;
        alias
    }

    fn too_deep(&self, path: &Path) -> Error {
        Error::invalid(
            self.kind,
            format!(
                "filter path {} too deep: at most {} edge hops",
                path.display(),
                MAX_EDGE_HOPS
            ),
        )
    }

    fn unknown(&self, schema: &KindSchema, path: &Path, segment: &str) -> Error {
        Error::invalid(
            self.kind,
            format!(
                "unknown field or edge {} in path {} for kind {}",
                segment,
                path.display(),
                schema.kind
            ),
        )
    }
}

/// Validate and compile an order-by clause against a kind's allow-list.
///
/// Column names are validated against the static allow-list before being
/// inlined, so the emitted text never contains caller input.
pub fn compile_order_by(kind: ResourceKind, order_by: &str) -> Result<String> {
    let schema = schema::schema_for(kind);
    let mut terms = Vec::new();
    for raw in order_by.split(',') {
        let mut words = raw.split_whitespace();
        let Some(column) = words.next() else {
            return Err(Error::invalid(kind, "empty order_by term"));
        };
        let direction = match words.next() {
            None => "ASC",
            Some(w) if w.eq_ignore_ascii_case("asc") => "ASC",
            Some(w) if w.eq_ignore_ascii_case("desc") => "DESC",
            Some(w) => {
                return Err(Error::invalid(
                    kind,
                    format!("invalid order_by direction {}", w),
                ));
            }
        };
        if words.next().is_some() {
            return Err(Error::invalid(
                kind,
                format!("malformed order_by term {}", raw.trim()),
            ));
        }
        if !schema.orderable(column) {
            return Err(Error::invalid(
                kind,
                format!("column {} is not orderable", column),
            ));
        }
        // Core columns live on the resources row; declared fields are
        // looked up through their projected rows.
        let sql_column = match column {
            "resource_id" => "r.id".to_string(),
            "created_at" => "r.created_at".to_string(),
            "updated_at" => "r.updated_at".to_string(),
            field => format!(
                "(SELECT f.value FROM resource_fields f \
                 WHERE f.resource_id = r.id AND f.field = '{}' LIMIT 1)",
                field
            ),
        };
        terms.push(format!("{} {}", sql_column, direction));
    }
    Ok(format!("ORDER BY {}", terms.join(", ")))
}

/// Validate offset/limit bounds, applying the default page size
pub fn validate_page(offset: u64, limit: Option<u64>) -> Result<(u64, u64)> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if limit == 0 {
        return Err(Error::InvalidArgument("limit must be positive".to_string()));
    }
    if limit > MAX_PAGE_SIZE {
        return Err(Error::InvalidArgument(format!(
            "limit {} exceeds maximum {}",
            limit, MAX_PAGE_SIZE
        )));
    }
    Ok((offset, limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parser::parse;

    fn compile_text(kind: ResourceKind, text: &str) -> Result<SqlPredicate> {
        compile(kind, &parse(text)?)
    }

    #[test]
    fn test_simple_field_predicate() {
        let p = compile_text(ResourceKind::Host, r#"name = "edge-1""#).unwrap();
        assert!(p.sql.contains("resource_fields"));
        assert_eq!(p.params, vec!["name".to_string(), "edge-1".to_string()]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = compile_text(ResourceKind::Host, r#"flux = "x""#).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_enum_symbol_checked() {
        assert!(compile_text(ResourceKind::Host, "desired_state = ONBOARDED").is_ok());
        let err = compile_text(ResourceKind::Host, "desired_state = FLYING").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_uint_value_encoded_padded() {
        let p = compile_text(ResourceKind::SingleSchedule, "start_seconds = 42").unwrap();
        assert!(p.params.contains(&encode_uint(42)));
        assert!(compile_text(ResourceKind::SingleSchedule, "start_seconds = soon").is_err());
    }

    #[test]
    fn test_bool_value_checked() {
        assert!(compile_text(ResourceKind::Provider, "auto_onboard = true").is_ok());
        assert!(compile_text(ResourceKind::Provider, "auto_onboard = yes").is_err());
    }

    #[test]
    fn test_edge_traversal_param_order() {
        let p = compile_text(ResourceKind::Host, r#"site.region.name = "emea""#).unwrap();
        // Edge params in traversal order, then field, then value
        assert_eq!(
            p.params,
            vec![
                "site".to_string(),
                "region".to_string(),
                "name".to_string(),
                "emea".to_string(),
            ]
        );
        assert!(p.sql.contains("resource_edges"));
    }

    #[test]
    fn test_traversal_depth_bound() {
        // region has a parent_region edge back onto region, so the path
        // can be made arbitrarily deep without becoming unknown.
        let mut path = String::new();
        for _ in 0..MAX_EDGE_HOPS {
            path.push_str("parent_region.");
        }
        path.push_str("name");
        assert!(compile_text(ResourceKind::Region, &format!("{} = \"x\"", path)).is_ok());

        let deeper = format!("parent_region.{} = \"x\"", path);
        let err = compile_text(ResourceKind::Region, &deeper).unwrap_err();
        assert!(err.to_string().contains("too deep"));
    }

    #[test]
    fn test_has_requires_edge() {
        assert!(compile_text(ResourceKind::Host, "has(site)").is_ok());
        assert!(compile_text(ResourceKind::Host, "has(site.region)").is_ok());
        assert!(compile_text(ResourceKind::Host, "has(name)").is_err());
    }

    #[test]
    fn test_eq_on_edge_rejected() {
        assert!(compile_text(ResourceKind::Host, r#"site = "site-1""#).is_err());
    }

    #[test]
    fn test_empty_string_matches_absent_or_empty() {
        let p = compile_text(ResourceKind::Host, r#"note = """#).unwrap();
        assert!(p.sql.contains("NOT EXISTS"));
        assert_eq!(p.params, vec!["note".to_string()]);
    }

    #[test]
    fn test_order_by_allow_list() {
        assert!(compile_order_by(ResourceKind::Host, "name desc").is_ok());
        assert!(compile_order_by(ResourceKind::Host, "created_at").is_ok());
        assert!(compile_order_by(ResourceKind::Host, "note").is_err());
        assert!(compile_order_by(ResourceKind::Host, "name sideways").is_err());
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(validate_page(0, None).unwrap(), (0, DEFAULT_PAGE_SIZE));
        assert_eq!(validate_page(5, Some(10)).unwrap(), (5, 10));
        assert!(validate_page(0, Some(0)).is_err());
        assert!(validate_page(0, Some(MAX_PAGE_SIZE + 1)).is_err());
    }
}
