//! Table, column, and index extraction

use pretty_assertions::assert_eq;
use rust_ddl_import::model::TypeArgs;
use rust_ddl_import::{parse_ddl_with, ParseOptions, SchemaModel, SequentialIdGenerator};

fn parse(sql: &str) -> SchemaModel {
    parse_ddl_with(sql, &ParseOptions::default(), &mut SequentialIdGenerator::new())
        .expect("import should not fail")
}

// ============================================================================
// Table headers
// ============================================================================

#[test]
fn test_table_header_variants() {
    let model = parse(
        "CREATE GLOBAL TEMPORARY TABLE gtt_session (id NUMBER) ON COMMIT PRESERVE ROWS;\n\
         CREATE PRIVATE TEMPORARY TABLE ora$ptt_scratch (id NUMBER) ON COMMIT DROP DEFINITION;\n\
         CREATE TABLE IF NOT EXISTS app.settings (k VARCHAR2(30), v VARCHAR2(4000));\n\
         create table lower_case (id number);",
    );

    let names: Vec<String> = model.tables.iter().map(|t| t.qualified_name()).collect();
    assert_eq!(
        names,
        vec!["gtt_session", "ora$ptt_scratch", "app.settings", "lower_case"]
    );
}

#[test]
fn test_quoted_schema_and_table() {
    let model = parse("CREATE TABLE \"Sales\".\"Order Items\" (\"Line No\" NUMBER(3));");
    let table = &model.tables[0];
    assert_eq!(table.schema.as_deref(), Some("Sales"));
    assert_eq!(table.name, "Order Items");
    assert_eq!(table.columns[0].name, "Line No");
}

#[test]
fn test_statement_without_column_list_is_skipped() {
    let model = parse(
        "CREATE TABLE copy_of_emp AS SELECT * FROM emp;\nCREATE TABLE real_one (id NUMBER);",
    );
    assert_eq!(model.tables.len(), 1);
    assert_eq!(model.tables[0].name, "real_one");
}

#[test]
fn test_repeated_create_table_merges_columns() {
    let model = parse(
        "CREATE TABLE t (id NUMBER PRIMARY KEY, a VARCHAR2(10));\n\
         CREATE TABLE T (ID NUMBER, b DATE);",
    );
    assert_eq!(model.tables.len(), 1);
    let names: Vec<&str> = model.tables[0].columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "a", "b"]);
    assert!(model.tables[0].column("id").unwrap().primary_key);
}

// ============================================================================
// Columns
// ============================================================================

#[test]
fn test_column_types_normalize_by_family() {
    let model = parse(
        "CREATE TABLE types (\n\
           c1 VARCHAR2(100 CHAR),\n\
           c2 NVARCHAR2(50),\n\
           c3 CHAR(1 BYTE),\n\
           c4 NUMBER(12,2),\n\
           c5 NUMBER(*,0),\n\
           c6 DOUBLE PRECISION,\n\
           c7 BINARY_FLOAT,\n\
           c8 DATE,\n\
           c9 TIMESTAMP(3) WITH LOCAL TIME ZONE,\n\
           c10 CLOB,\n\
           c11 LONG RAW,\n\
           c12 ROWID,\n\
           c13 SYS.XMLTYPE,\n\
           c14 MY_OBJECT_T\n\
         );",
    );

    let types: Vec<&str> = model.tables[0]
        .columns
        .iter()
        .map(|c| c.data_type.as_str())
        .collect();
    assert_eq!(
        types,
        vec![
            "varchar",
            "nvarchar",
            "char",
            "numeric",
            "numeric",
            "double",
            "float",
            "date",
            "timestampltz",
            "clob",
            "long raw",
            "rowid",
            "xml",
            "MY_OBJECT_T"
        ]
    );

    let table = &model.tables[0];
    assert_eq!(
        table.column("c1").unwrap().type_args,
        Some(TypeArgs::Length { length: 100 })
    );
    assert_eq!(
        table.column("c4").unwrap().type_args,
        Some(TypeArgs::PrecisionScale {
            precision: 12,
            scale: 2
        })
    );
    assert_eq!(
        table.column("c5").unwrap().type_args,
        Some(TypeArgs::PrecisionScale {
            precision: 38,
            scale: 0
        })
    );
    assert_eq!(table.column("c8").unwrap().type_args, None);
}

#[test]
fn test_national_character_types() {
    let model = parse(
        "CREATE TABLE labels (code NATIONAL CHAR(4), title NATIONAL CHAR VARYING(200), note NATIONAL CHARACTER VARYING(50));",
    );
    let types: Vec<&str> = model.tables[0]
        .columns
        .iter()
        .map(|c| c.data_type.as_str())
        .collect();
    assert_eq!(types, vec!["nchar", "nvarchar", "nvarchar"]);
    assert_eq!(
        model.tables[0].column("title").unwrap().type_args,
        Some(TypeArgs::Length { length: 200 })
    );
}

#[test]
fn test_column_modifiers() {
    let model = parse(
        "CREATE TABLE t (\n\
           id NUMBER GENERATED ALWAYS AS IDENTITY,\n\
           status CHAR(1) DEFAULT 'A' NOT NULL,\n\
           note VARCHAR2(200) DEFAULT 'x, y',\n\
           flag NUMBER(1) CHECK (flag IS NOT NULL),\n\
           total AS (id * 2),\n\
           code VARCHAR2(10) CONSTRAINT uq_code UNIQUE\n\
         );",
    );
    let table = &model.tables[0];
    assert_eq!(table.columns.len(), 5);

    assert!(table.column("id").unwrap().increment);

    let status = table.column("status").unwrap();
    assert_eq!(status.default.as_deref(), Some("'A'"));
    assert!(!status.nullable);

    assert_eq!(table.column("note").unwrap().default.as_deref(), Some("'x, y'"));
    assert!(table.column("flag").unwrap().nullable);
    assert!(table.column("total").is_none());

    let code = table.column("code").unwrap();
    assert!(code.unique);
    assert!(!code.primary_key);
    assert!(table.has_index("UQ_t_code"));
}

#[test]
fn test_unparseable_clauses_are_skipped() {
    let model = parse(
        "CREATE TABLE t (\n\
           id NUMBER,\n\
           SUPPLEMENTAL LOG DATA (ALL) COLUMNS,\n\
           ???,\n\
           name VARCHAR2(10)\n\
         );",
    );
    let names: Vec<&str> = model.tables[0].columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name"]);
}

#[test]
fn test_clause_words_are_allowed_as_column_names() {
    let model = parse(
        "CREATE TABLE settings (id NUMBER PRIMARY KEY, key VARCHAR2(100) NOT NULL, value VARCHAR2(4000), period DATE, ref NUMBER);\n\
         CREATE TABLE legacy (id NUMBER, code VARCHAR2(10), KEY ix_legacy_code (code));",
    );

    let names: Vec<&str> = model.tables[0].columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "key", "value", "period", "ref"]);
    let key = model.tables[0].column("key").unwrap();
    assert_eq!(key.data_type, "varchar");
    assert!(!key.nullable);

    let legacy: Vec<&str> = model.tables[1].columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(legacy, vec!["id", "code"]);
}

// ============================================================================
// Unique constraints and indexes
// ============================================================================

#[test]
fn test_unique_constraints_create_indexes() {
    let model = parse(
        "CREATE TABLE users (\n\
           id NUMBER PRIMARY KEY,\n\
           email VARCHAR2(100),\n\
           tenant_id NUMBER,\n\
           login VARCHAR2(30),\n\
           CONSTRAINT uq_users_email UNIQUE (email),\n\
           UNIQUE (tenant_id, login)\n\
         );",
    );
    let table = &model.tables[0];

    let index_names: Vec<&str> = table.indexes.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(index_names, vec!["uq_users_email", "UQ_users_tenant_id_login"]);
    assert!(table.indexes.iter().all(|i| i.unique));

    assert!(table.column("email").unwrap().unique);
    assert!(!table.column("tenant_id").unwrap().unique);
    assert!(!table.column("login").unwrap().unique);
}

#[test]
fn test_index_variants() {
    let model = parse(
        "CREATE TABLE app.orders (id NUMBER, customer_id NUMBER, status VARCHAR2(10));\n\
         CREATE INDEX app.ix_orders_customer ON app.orders (customer_id DESC) TABLESPACE idx;\n\
         CREATE BITMAP INDEX ix_orders_status ON orders (status);\n\
         CREATE INDEX ix_missing ON missing_table (id);\n\
         CREATE INDEX IX_ORDERS_CUSTOMER ON app.orders (customer_id);",
    );
    let table = &model.tables[0];
    assert_eq!(table.indexes.len(), 2);
    assert_eq!(table.indexes[0].name, "ix_orders_customer");
    assert_eq!(table.indexes[0].columns, vec!["customer_id"]);
    assert_eq!(table.indexes[1].name, "ix_orders_status");
    assert!(!table.indexes[1].unique);
}

#[test]
fn test_schema_aware_index_lookup() {
    let model = parse(
        "CREATE TABLE hr.audit (id NUMBER);\n\
         CREATE TABLE sales.audit (id NUMBER);\n\
         CREATE INDEX ix_sales_audit ON sales.audit (id);",
    );
    assert!(model.table(Some("hr"), "audit").unwrap().indexes.is_empty());
    assert_eq!(model.table(Some("sales"), "audit").unwrap().indexes.len(), 1);
}
