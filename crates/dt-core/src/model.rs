//! Canonical schema model
//!
//! A [`Database`] owns its tables in an arena (declaration order) plus a
//! name index. Join edges refer to their target by name, so tables never
//! own each other and self-references need no special case.

use crate::error::{ModelError, ModelResult};
use crate::types::CanonicalType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Schema a table lands in when nothing names one
pub const DEFAULT_SCHEMA: &str = "falcon_default_schema";

/// True for [`DEFAULT_SCHEMA`], in any case
pub fn is_default_schema(schema: &str) -> bool {
    schema.eq_ignore_ascii_case(DEFAULT_SCHEMA)
}

/// Whether identifier lookup folds case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameCase {
    /// `Orders` and `orders` are different tables
    Sensitive,
    /// `Orders` and `orders` are the same table
    #[default]
    Insensitive,
}

impl NameCase {
    /// Build a case-insensitive policy from a `case_sensitive` flag
    pub fn from_sensitive(case_sensitive: bool) -> Self {
        if case_sensitive {
            NameCase::Sensitive
        } else {
            NameCase::Insensitive
        }
    }

    /// Lookup key for a name under this policy
    pub fn key(&self, name: &str) -> String {
        match self {
            NameCase::Sensitive => name.to_string(),
            NameCase::Insensitive => name.to_lowercase(),
        }
    }

    /// Compare two names under this policy
    pub fn matches(&self, a: &str, b: &str) -> bool {
        match self {
            NameCase::Sensitive => a == b,
            NameCase::Insensitive => a.to_lowercase() == b.to_lowercase(),
        }
    }
}

/// A table column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name as declared
    pub name: String,
    /// Mapped type
    pub ty: CanonicalType,
    /// Whether NULL is allowed
    pub nullable: bool,
    /// Source type text, kept for diagnostics
    pub raw_type: String,
}

impl Column {
    /// Create a nullable column whose raw type is the canonical type name
    pub fn new(name: impl Into<String>, ty: CanonicalType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: true,
            raw_type: ty.display_name(),
        }
    }

    /// Set the nullable flag
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set the source type text
    pub fn with_raw_type(mut self, raw: impl Into<String>) -> Self {
        self.raw_type = raw.into();
        self
    }
}

/// Ordered primary key columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub columns: Vec<String>,
}

/// Whether a join edge is a foreign key or a free-form relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JoinKind {
    /// Targets the far table's primary key position-for-position
    ForeignKey,
    /// Any conjunction of column equalities
    Relationship,
}

impl JoinKind {
    /// Prefix for generated constraint names
    pub fn name_prefix(&self) -> &'static str {
        match self {
            JoinKind::ForeignKey => "FK",
            JoinKind::Relationship => "REL",
        }
    }
}

impl std::fmt::Display for JoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinKind::ForeignKey => write!(f, "foreign key"),
            JoinKind::Relationship => write!(f, "relationship"),
        }
    }
}

/// One `local = remote` equality in a join condition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnPair {
    /// Column on the table declaring the edge
    pub local: String,
    /// Column on the target table
    pub remote: String,
}

impl ColumnPair {
    pub fn new(local: impl Into<String>, remote: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            remote: remote.into(),
        }
    }
}

/// Outgoing foreign key or relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinEdge {
    /// Constraint name
    pub name: String,
    /// Target table name
    pub target: String,
    /// FK or relationship
    pub kind: JoinKind,
    /// Join condition, never empty once stored in a model
    pub pairs: Vec<ColumnPair>,
}

impl JoinEdge {
    /// Local column names in condition order
    pub fn local_columns(&self) -> Vec<&str> {
        self.pairs.iter().map(|p| p.local.as_str()).collect()
    }

    /// Remote column names in condition order
    pub fn remote_columns(&self) -> Vec<&str> {
        self.pairs.iter().map(|p| p.remote.as_str()).collect()
    }
}

/// Partitioning scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionKind {
    #[default]
    Hash,
}

/// How a table is distributed across shards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardingSpec {
    #[serde(default)]
    pub kind: PartitionKind,
    /// Number of buckets, always > 0 in a model
    pub shard_count: u32,
    /// Ordered key columns
    pub key: Vec<String>,
}

impl ShardingSpec {
    /// Hash partitioning on `key` into `shard_count` buckets
    pub fn hash(shard_count: u32, key: Vec<String>) -> Self {
        Self {
            kind: PartitionKind::Hash,
            shard_count,
            key,
        }
    }
}

/// A table in the canonical model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub(crate) name: String,
    pub(crate) schema: String,
    pub(crate) columns: Vec<Column>,
    pub(crate) primary_key: Option<PrimaryKey>,
    pub(crate) joins: Vec<JoinEdge>,
    pub(crate) sharding: Option<ShardingSpec>,
    pub(crate) row_count: Option<u64>,
    #[serde(skip)]
    pub(crate) case: NameCase,
}

impl Table {
    pub(crate) fn new(name: impl Into<String>, case: NameCase) -> Self {
        Self {
            name: name.into(),
            schema: DEFAULT_SCHEMA.to_string(),
            columns: Vec::new(),
            primary_key: None,
            joins: Vec::new(),
            sharding: None,
            row_count: None,
            case,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema the table belongs to
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Columns in declaration order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column under the database's case policy
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| self.case.matches(&c.name, name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn primary_key(&self) -> Option<&PrimaryKey> {
        self.primary_key.as_ref()
    }

    /// Primary key columns, empty when the table has no key
    pub fn primary_key_columns(&self) -> &[String] {
        self.primary_key
            .as_ref()
            .map(|pk| pk.columns.as_slice())
            .unwrap_or(&[])
    }

    /// True if a non-empty primary key is declared
    pub fn has_primary_key(&self) -> bool {
        !self.primary_key_columns().is_empty()
    }

    /// True if `columns` is exactly the primary key, ignoring order
    pub fn is_primary_key<S: AsRef<str>>(&self, columns: &[S]) -> bool {
        let pk = self.primary_key_columns();
        if pk.is_empty() || pk.len() != columns.len() {
            return false;
        }
        let pk: BTreeSet<String> = pk.iter().map(|c| self.case.key(c)).collect();
        let cols: BTreeSet<String> = columns.iter().map(|c| self.case.key(c.as_ref())).collect();
        pk == cols
    }

    /// All outgoing join edges in declaration order
    pub fn joins(&self) -> &[JoinEdge] {
        &self.joins
    }

    /// Outgoing foreign keys
    pub fn foreign_keys(&self) -> impl Iterator<Item = &JoinEdge> {
        self.joins
            .iter()
            .filter(|j| j.kind == JoinKind::ForeignKey)
    }

    /// Outgoing relationships
    pub fn relationships(&self) -> impl Iterator<Item = &JoinEdge> {
        self.joins
            .iter()
            .filter(|j| j.kind == JoinKind::Relationship)
    }

    pub fn sharding(&self) -> Option<&ShardingSpec> {
        self.sharding.as_ref()
    }

    /// Approximate row count, when the source recorded one
    pub fn row_count(&self) -> Option<u64> {
        self.row_count
    }

    fn has_join_named(&self, name: &str) -> bool {
        self.joins.iter().any(|j| self.case.matches(&j.name, name))
    }
}

/// Stable index of a table within its database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub(crate) usize);

impl TableId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A database: named, ordered collection of tables
#[derive(Debug, Clone, Serialize)]
pub struct Database {
    name: String,
    #[serde(skip)]
    case: NameCase,
    tables: Vec<Table>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Database {
    /// Create an empty, case-insensitive database
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_case(name, NameCase::Insensitive)
    }

    /// Create an empty database with an explicit case policy
    pub fn with_case(name: impl Into<String>, case: NameCase) -> Self {
        Self {
            name: name.into(),
            case,
            tables: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn case(&self) -> NameCase {
        self.case
    }

    /// Tables in declaration order
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table_id(&self, name: &str) -> Option<TableId> {
        self.index.get(&self.case.key(name)).copied().map(TableId)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.table_id(name).map(|id| &self.tables[id.0])
    }

    pub fn get(&self, id: TableId) -> Option<&Table> {
        self.tables.get(id.0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table_id(name).is_some()
    }

    /// Insert a table without checking any invariant
    #[cfg(test)]
    pub(crate) fn push_unchecked(&mut self, table: Table) {
        self.index.insert(self.case.key(&table.name), self.tables.len());
        self.tables.push(table);
    }

    fn table_mut(&mut self, name: &str) -> ModelResult<&mut Table> {
        let id = self.table_id(name).ok_or_else(|| ModelError::UnknownTable {
            table: name.to_string(),
        })?;
        Ok(&mut self.tables[id.0])
    }

    fn require_table(&self, name: &str) -> ModelResult<&Table> {
        self.table(name).ok_or_else(|| ModelError::UnknownTable {
            table: name.to_string(),
        })
    }

    /// Add an empty table to the default schema
    pub fn add_table(&mut self, name: impl Into<String>) -> ModelResult<TableId> {
        self.add_table_in(DEFAULT_SCHEMA, name)
    }

    /// Add an empty table to `schema`.
    ///
    /// Table names are unique across schemas: joins and lookups use the
    /// bare name.
    pub fn add_table_in(
        &mut self,
        schema: impl Into<String>,
        name: impl Into<String>,
    ) -> ModelResult<TableId> {
        let name = name.into();
        let key = self.case.key(&name);
        if let Some(&existing) = self.index.get(&key) {
            return Err(ModelError::DuplicateTable {
                table: name,
                schema: self.tables[existing].schema.clone(),
            });
        }
        let id = self.tables.len();
        let mut table = Table::new(name, self.case);
        table.schema = schema.into();
        self.tables.push(table);
        self.index.insert(key, id);
        Ok(TableId(id))
    }

    /// Distinct schemas in order of first use
    pub fn schemas(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.tables
            .iter()
            .map(|t| t.schema.as_str())
            .filter(|s| seen.insert(self.case.key(s)))
            .collect()
    }

    /// Append a column to a table
    pub fn add_column(&mut self, table: &str, column: Column) -> ModelResult<()> {
        let t = self.table_mut(table)?;
        if t.has_column(&column.name) {
            return Err(ModelError::DuplicateColumn {
                table: t.name.clone(),
                column: column.name,
            });
        }
        t.columns.push(column);
        Ok(())
    }

    /// Set (or replace) a table's primary key
    pub fn set_primary_key(&mut self, table: &str, columns: Vec<String>) -> ModelResult<()> {
        let t = self.require_table(table)?;
        if columns.is_empty() {
            return Err(ModelError::EmptyKey {
                table: t.name.clone(),
                context: "primary key".into(),
            });
        }
        check_columns_exist(t, &columns, "primary key")?;
        self.table_mut(table)?.primary_key = Some(PrimaryKey { columns });
        Ok(())
    }

    /// Set (or replace) a table's sharding
    pub fn set_sharding(&mut self, table: &str, spec: ShardingSpec) -> ModelResult<()> {
        let t = self.require_table(table)?;
        if spec.shard_count == 0 {
            return Err(ModelError::ZeroShards {
                table: t.name.clone(),
            });
        }
        if spec.key.is_empty() {
            return Err(ModelError::EmptyKey {
                table: t.name.clone(),
                context: "shard key".into(),
            });
        }
        check_columns_exist(t, &spec.key, "shard key")?;
        self.table_mut(table)?.sharding = Some(spec);
        Ok(())
    }

    /// Record an approximate row count
    pub fn set_row_count(&mut self, table: &str, rows: Option<u64>) -> ModelResult<()> {
        self.table_mut(table)?.row_count = rows;
        Ok(())
    }

    /// Add a foreign key from `table` to the primary key of `target`.
    ///
    /// Fails with [`ModelError::ForeignKeyNotPrimaryKey`] when the remote
    /// columns exist but are not the target's primary key in order.
    pub fn add_foreign_key(
        &mut self,
        table: &str,
        name: impl Into<String>,
        target: &str,
        pairs: Vec<ColumnPair>,
    ) -> ModelResult<()> {
        self.add_join(
            table,
            JoinEdge {
                name: name.into(),
                target: target.to_string(),
                kind: JoinKind::ForeignKey,
                pairs,
            },
        )
    }

    /// Add a relationship from `table` to `target`
    pub fn add_relationship(
        &mut self,
        table: &str,
        name: impl Into<String>,
        target: &str,
        pairs: Vec<ColumnPair>,
    ) -> ModelResult<()> {
        self.add_join(
            table,
            JoinEdge {
                name: name.into(),
                target: target.to_string(),
                kind: JoinKind::Relationship,
                pairs,
            },
        )
    }

    /// Add a join edge after checking every model invariant it touches
    pub fn add_join(&mut self, table: &str, edge: JoinEdge) -> ModelResult<()> {
        self.check_join(table, &edge)?;
        self.table_mut(table)?.joins.push(edge);
        Ok(())
    }

    fn check_join(&self, table: &str, edge: &JoinEdge) -> ModelResult<()> {
        let source = self.require_table(table)?;
        let context = format!("{} '{}'", edge.kind, edge.name);

        if edge.pairs.is_empty() {
            return Err(ModelError::EmptyKey {
                table: source.name.clone(),
                context,
            });
        }
        if source.has_join_named(&edge.name) {
            return Err(ModelError::DuplicateConstraint {
                table: source.name.clone(),
                name: edge.name.clone(),
            });
        }

        let target = self.require_table(&edge.target)?;
        let local: Vec<String> = edge.pairs.iter().map(|p| p.local.clone()).collect();
        let remote: Vec<String> = edge.pairs.iter().map(|p| p.remote.clone()).collect();
        check_columns_exist(source, &local, &context)?;
        check_columns_exist(target, &remote, &context)?;

        if edge.kind == JoinKind::ForeignKey {
            let pk = target.primary_key_columns();
            let matches_pk = pk.len() == remote.len()
                && pk.iter().zip(&remote).all(|(a, b)| self.case.matches(a, b));
            if !matches_pk {
                return Err(ModelError::ForeignKeyNotPrimaryKey {
                    name: edge.name.clone(),
                    target: target.name.clone(),
                    target_columns: remote.join(", "),
                    primary_key: pk.join(", "),
                });
            }
        }

        for pair in &edge.pairs {
            let (Some(l), Some(r)) = (source.column(&pair.local), target.column(&pair.remote))
            else {
                continue;
            };
            if !l.ty.is_compatible_with(&r.ty) {
                return Err(ModelError::IncompatibleTypes {
                    context: edge.kind.to_string(),
                    name: edge.name.clone(),
                    local: format!("{}.{}", source.name, l.name),
                    local_type: l.ty.to_string(),
                    remote: format!("{}.{}", target.name, r.name),
                    remote_type: r.ty.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Generate `FK_<from>_to_<to>` / `REL_<from>_to_<to>`, numbered when taken
    pub fn unique_join_name(&self, table: &str, kind: JoinKind, target: &str) -> String {
        let base = format!("{}_{}_to_{}", kind.name_prefix(), table, target);
        let Some(t) = self.table(table) else {
            return base;
        };
        if !t.has_join_named(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if !t.has_join_named(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Every join edge in the model with its source table
    pub fn joins(&self) -> impl Iterator<Item = (&Table, &JoinEdge)> {
        self.tables
            .iter()
            .flat_map(|t| t.joins.iter().map(move |j| (t, j)))
    }

    /// Join edges whose target is `table` (including self-references)
    pub fn incoming_edges(&self, table: &str) -> Vec<(&Table, &JoinEdge)> {
        self.joins()
            .filter(|(_, j)| self.case.matches(&j.target, table))
            .collect()
    }

    /// Order-insensitive structural summary for equality checks
    pub fn shape(&self) -> SchemaShape {
        let tables = self
            .tables
            .iter()
            .map(|t| {
                let columns = t
                    .columns
                    .iter()
                    .map(|c| (self.case.key(&c.name), (c.ty, c.nullable)))
                    .collect();
                let edges = |kind: JoinKind| -> BTreeSet<EdgeShape> {
                    t.joins
                        .iter()
                        .filter(|j| j.kind == kind)
                        .map(|j| EdgeShape {
                            name: self.case.key(&j.name),
                            target: self.case.key(&j.target),
                            pairs: j
                                .pairs
                                .iter()
                                .map(|p| (self.case.key(&p.local), self.case.key(&p.remote)))
                                .collect(),
                        })
                        .collect()
                };
                let shape = TableShape {
                    schema: self.case.key(&t.schema),
                    columns,
                    primary_key: t
                        .primary_key_columns()
                        .iter()
                        .map(|c| self.case.key(c))
                        .collect(),
                    foreign_keys: edges(JoinKind::ForeignKey),
                    relationships: edges(JoinKind::Relationship),
                    sharding: t.sharding.as_ref().map(|s| {
                        (
                            s.shard_count,
                            s.key.iter().map(|c| self.case.key(c)).collect(),
                        )
                    }),
                };
                (self.case.key(&t.name), shape)
            })
            .collect();
        SchemaShape { tables }
    }
}

fn check_columns_exist(table: &Table, columns: &[String], context: &str) -> ModelResult<()> {
    match columns.iter().find(|c| !table.has_column(c)) {
        Some(missing) => Err(ModelError::UnknownColumn {
            table: table.name.clone(),
            column: missing.clone(),
            context: context.to_string(),
        }),
        None => Ok(()),
    }
}

/// Structural summary of a join edge
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EdgeShape {
    pub name: String,
    pub target: String,
    pub pairs: Vec<(String, String)>,
}

/// Structural summary of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableShape {
    pub schema: String,
    pub columns: BTreeMap<String, (CanonicalType, bool)>,
    pub primary_key: Vec<String>,
    pub foreign_keys: BTreeSet<EdgeShape>,
    pub relationships: BTreeSet<EdgeShape>,
    pub sharding: Option<(u32, Vec<String>)>,
}

/// Declaration-order-insensitive view of a [`Database`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaShape {
    pub tables: BTreeMap<String, TableShape>,
}

impl SchemaShape {
    /// Describe every difference between two shapes, `self` first
    pub fn differences(&self, other: &SchemaShape) -> Vec<String> {
        let mut out = Vec::new();
        for name in self.tables.keys() {
            if !other.tables.contains_key(name) {
                out.push(format!("table '{name}' missing after round trip"));
            }
        }
        for name in other.tables.keys() {
            if !self.tables.contains_key(name) {
                out.push(format!("unexpected table '{name}'"));
            }
        }
        for (name, left) in &self.tables {
            let Some(right) = other.tables.get(name) else {
                continue;
            };
            if left.schema != right.schema {
                out.push(format!(
                    "{name}: schema '{}' became '{}'",
                    left.schema, right.schema
                ));
            }
            if left.columns != right.columns {
                for (col, l) in &left.columns {
                    match right.columns.get(col) {
                        None => out.push(format!("{name}.{col}: column missing")),
                        Some(r) if r != l => out.push(format!(
                            "{name}.{col}: {} {} became {} {}",
                            l.0,
                            nullability(l.1),
                            r.0,
                            nullability(r.1)
                        )),
                        Some(_) => {}
                    }
                }
                for col in right.columns.keys() {
                    if !left.columns.contains_key(col) {
                        out.push(format!("{name}.{col}: unexpected column"));
                    }
                }
            }
            if left.primary_key != right.primary_key {
                out.push(format!(
                    "{name}: primary key ({}) became ({})",
                    left.primary_key.join(", "),
                    right.primary_key.join(", ")
                ));
            }
            if left.foreign_keys != right.foreign_keys {
                out.push(format!("{name}: foreign keys differ"));
            }
            if left.relationships != right.relationships {
                out.push(format!("{name}: relationships differ"));
            }
            if left.sharding != right.sharding {
                out.push(format!("{name}: sharding differs"));
            }
        }
        out
    }
}

fn nullability(nullable: bool) -> &'static str {
    if nullable {
        "NULL"
    } else {
        "NOT NULL"
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
