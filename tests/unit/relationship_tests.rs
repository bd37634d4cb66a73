//! Foreign key extraction, deduplication, and linking

use pretty_assertions::assert_eq;
use rust_ddl_import::model::{ForeignKey, SequentialIdGenerator};
use rust_ddl_import::parser::extract_foreign_keys_from_alter;
use rust_ddl_import::{parse_ddl_with, ParseOptions, SchemaModel};

fn parse(sql: &str) -> SchemaModel {
    parse_ddl_with(sql, &ParseOptions::default(), &mut SequentialIdGenerator::new())
        .expect("import should not fail")
}

fn parse_manual_only(sql: &str) -> SchemaModel {
    let options = ParseOptions {
        grammar_extraction: false,
    };
    parse_ddl_with(sql, &options, &mut SequentialIdGenerator::new()).expect("import should not fail")
}

fn links(model: &SchemaModel) -> Vec<(String, String, String, String)> {
    model
        .relationships
        .iter()
        .map(|r| {
            (
                r.source_table.clone(),
                r.source_column.clone(),
                r.target_table.clone(),
                r.target_column.clone(),
            )
        })
        .collect()
}

#[test]
fn test_composite_foreign_key_yields_one_relationship_per_column() {
    let model = parse(
        "CREATE TABLE periods (year NUMBER(4), month NUMBER(2), CONSTRAINT pk_periods PRIMARY KEY (year, month));\n\
         CREATE TABLE sales (id NUMBER PRIMARY KEY, yr NUMBER(4), mon NUMBER(2),\n\
           CONSTRAINT fk_sales_period FOREIGN KEY (yr, mon) REFERENCES periods (year, month) ON DELETE CASCADE);",
    );

    assert_eq!(
        links(&model),
        vec![
            ("sales".into(), "yr".into(), "periods".into(), "year".into()),
            ("sales".into(), "mon".into(), "periods".into(), "month".into()),
        ]
    );
    assert!(model.relationships.iter().all(|r| r.name == "fk_sales_period"));
    assert!(model
        .relationships
        .iter()
        .all(|r| r.delete_action.as_deref() == Some("CASCADE") && r.update_action.is_none()));
}

#[test]
fn test_reference_without_column_uses_target_primary_key() {
    let model = parse(
        "CREATE TABLE customers (customer_id NUMBER PRIMARY KEY, name VARCHAR2(50));\n\
         CREATE TABLE regions (a NUMBER, b NUMBER, PRIMARY KEY (a, b));\n\
         CREATE TABLE orders (id NUMBER PRIMARY KEY,\n\
           customer_id NUMBER REFERENCES customers,\n\
           region_a NUMBER REFERENCES regions);",
    );

    assert_eq!(model.relationships.len(), 2);
    assert_eq!(model.relationships[0].target_column, "customer_id");
    assert_eq!(model.relationships[1].target_column, "");
    assert!(model.relationships.iter().all(ForeignKey::is_linked));
}

#[test]
fn test_schema_qualified_references_resolve_to_the_right_table() {
    let model = parse(
        "CREATE TABLE hr.dept (id NUMBER PRIMARY KEY);\n\
         CREATE TABLE sales.dept (id NUMBER PRIMARY KEY);\n\
         CREATE TABLE sales.emp (id NUMBER PRIMARY KEY, dept_id NUMBER,\n\
           CONSTRAINT fk_emp_dept FOREIGN KEY (dept_id) REFERENCES sales.dept (id));",
    );

    let sales_dept = model.table(Some("sales"), "dept").unwrap();
    let rel = &model.relationships[0];
    assert_eq!(rel.target_schema.as_deref(), Some("sales"));
    assert_eq!(rel.target_table_id.as_deref(), Some(sales_dept.id.as_str()));
}

#[test]
fn test_same_named_links_in_different_schemas_are_kept_apart() {
    let sql = "CREATE TABLE hr.dept (id NUMBER PRIMARY KEY);\n\
               CREATE TABLE sales.dept (id NUMBER PRIMARY KEY);\n\
               CREATE TABLE hr.emp (id NUMBER PRIMARY KEY, dept_id NUMBER REFERENCES hr.dept (id));\n\
               CREATE TABLE sales.emp (id NUMBER PRIMARY KEY, dept_id NUMBER REFERENCES sales.dept (id));";

    for model in [parse(sql), parse_manual_only(sql)] {
        let resolved: Vec<(Option<&str>, Option<&str>, Option<&str>)> = model
            .relationships
            .iter()
            .map(|r| {
                (
                    r.source_schema.as_deref(),
                    r.source_table_id.as_deref(),
                    r.target_table_id.as_deref(),
                )
            })
            .collect();
        assert_eq!(
            resolved,
            vec![
                (Some("hr"), Some("t3"), Some("t1")),
                (Some("sales"), Some("t4"), Some("t2")),
            ]
        );
    }
}

#[test]
fn test_unknown_schema_falls_back_to_table_name() {
    let model = parse(
        "CREATE TABLE dept (id NUMBER PRIMARY KEY);\n\
         CREATE TABLE emp (id NUMBER PRIMARY KEY, dept_id NUMBER REFERENCES OTHER_SCHEMA.DEPT (ID));",
    );
    assert_eq!(model.relationships.len(), 1);
    assert_eq!(model.relationships[0].target_table_id.as_deref(), Some("t1"));
}

#[test]
fn test_alter_foreign_keys_are_not_duplicated_across_extractors() {
    let sql = "CREATE TABLE a (id NUMBER PRIMARY KEY);\n\
               CREATE TABLE b (id NUMBER PRIMARY KEY, a_id NUMBER REFERENCES a (id));\n\
               ALTER TABLE b ADD CONSTRAINT fk_b_a FOREIGN KEY (a_id) REFERENCES a (id) ON UPDATE CASCADE;\n\
               ALTER TABLE B ADD CONSTRAINT FK_B_A_AGAIN FOREIGN KEY (A_ID) REFERENCES A (ID);";

    for model in [parse(sql), parse_manual_only(sql)] {
        assert_eq!(model.relationships.len(), 1);
        assert_eq!(model.relationships[0].name, "FK_b_a_id");
    }
}

#[test]
fn test_alter_statement_with_several_constraints() {
    let model = parse(
        "CREATE TABLE dept (id NUMBER);\n\
         CREATE TABLE emp (id NUMBER, dept_id NUMBER, mgr_id NUMBER);\n\
         ALTER TABLE dept ADD CONSTRAINT pk_dept PRIMARY KEY (id);\n\
         ALTER TABLE emp ADD CONSTRAINT pk_emp PRIMARY KEY (id)\n\
           ADD CONSTRAINT fk_emp_dept FOREIGN KEY (dept_id) REFERENCES dept (id) ON DELETE SET NULL\n\
           ADD CONSTRAINT fk_emp_mgr FOREIGN KEY (mgr_id) REFERENCES emp (id);",
    );

    let emp = model.table(None, "emp").unwrap();
    assert!(emp.column("id").unwrap().primary_key);

    let names: Vec<&str> = model.relationships.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["fk_emp_dept", "fk_emp_mgr"]);
    assert_eq!(model.relationships[0].delete_action.as_deref(), Some("SET NULL"));
    assert_eq!(model.relationships[1].delete_action, None);
}

#[test]
fn test_extract_foreign_keys_from_alter_is_pure() {
    let statements = [
        "ALTER TABLE sales.orders ADD CONSTRAINT fk_orders_cust FOREIGN KEY (cust_id) REFERENCES crm.customers (id)",
        "ALTER TABLE sales.orders ADD CONSTRAINT pk_orders PRIMARY KEY (id)",
        "CREATE TABLE ignored (id NUMBER)",
    ];
    let fks = extract_foreign_keys_from_alter(&statements);

    assert_eq!(fks.len(), 1);
    let fk = &fks[0];
    assert_eq!(fk.name, "fk_orders_cust");
    assert_eq!(fk.source_schema.as_deref(), Some("sales"));
    assert_eq!(fk.source_table, "orders");
    assert_eq!(fk.source_column, "cust_id");
    assert_eq!(fk.target_schema.as_deref(), Some("crm"));
    assert_eq!(fk.target_table, "customers");
    assert_eq!(fk.target_column, "id");
    assert_eq!(fk.source_table_id, None);
    assert_eq!(fk.target_table_id, None);
}

#[test]
fn test_relationships_serialize_with_camel_case_keys() {
    let model = parse(
        "CREATE TABLE a (id NUMBER PRIMARY KEY);\n\
         CREATE TABLE b (id NUMBER PRIMARY KEY, a_id NUMBER REFERENCES a (id) ON DELETE CASCADE);",
    );
    let json = serde_json::to_value(&model).unwrap();
    let rel = &json["relationships"][0];
    assert_eq!(rel["sourceTableId"], "t2");
    assert_eq!(rel["targetTableId"], "t1");
    assert_eq!(rel["deleteAction"], "CASCADE");
    assert!(rel.get("updateAction").is_none());
    assert_eq!(json["tables"][0]["columns"][0]["primaryKey"], true);
    assert_eq!(json["tables"][0]["columns"][0]["type"], "numeric");
}
