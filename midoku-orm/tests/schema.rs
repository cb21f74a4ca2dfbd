use midoku_orm::prelude::*;
use midoku_orm::schema::schema;
use midoku_orm::{ColumnInfo, Sql, TableConstraint};

table! {
    pub mod author => "Author" {
        name: String,
        email: Option<String> [unique],
    }
}

table! {
    pub mod book => "Book" {
        title: String,
        author_id: Option<i64>,
        pages: i64,
        rating: Option<f64>,
        cover: Option<Vec<u8>>,
        finished: bool,
    }
    constraints {
        foreign_key(author_id) references author(id);
        unique(title, author_id);
    }
}

table! {
    pub mod shelf_entry => "ShelfEntry" {
        shelf: String,
        position: i64,
    }
    constraints {
        primary_key(shelf, position);
    }
}

#[test]
fn implicit_primary_key_comes_first() {
    let schema = book::table::schema();
    assert_eq!(schema.name, "Book");
    assert_eq!(
        schema.column_names(),
        vec!["id", "title", "author_id", "pages", "rating", "cover", "finished"]
    );
    assert!(schema.columns[0].is_primary_key());
    assert!(schema.columns[1..].iter().all(|c| !c.is_primary_key()));
}

#[test]
fn column_metadata_follows_value_types() {
    let title: &ColumnInfo = book::title::info();
    assert_eq!(title.sql_type, "TEXT");
    assert!(!title.nullable);

    let rating = book::rating::info();
    assert_eq!(rating.sql_type, "REAL");
    assert!(rating.nullable);

    assert_eq!(book::cover::info().sql_type, "BLOB");
    assert_eq!(book::finished::info().sql_type, "BOOLEAN");
    assert_eq!(book::pages::INDEX, 3);
    assert_eq!(book::pages::name(), "pages");
}

#[test]
fn columns_ddl() {
    assert_eq!(
        book::table::schema().columns_ddl(),
        "id INTEGER PRIMARY KEY, title TEXT NOT NULL, author_id INTEGER, pages INTEGER NOT NULL, \
         rating REAL, cover BLOB, finished BOOLEAN NOT NULL"
    );
    assert_eq!(
        author::table::schema().columns_ddl(),
        "id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT UNIQUE"
    );
}

#[test]
fn table_constraints() {
    let constraints = book::table::constraints();
    assert_eq!(
        constraints,
        vec![
            TableConstraint::ForeignKey {
                columns: vec!["author_id"],
                table: "Author",
                references: vec!["id"],
            },
            TableConstraint::Unique(vec!["title", "author_id"]),
        ]
    );
    assert_eq!(
        book::table::schema().constraints_ddl(),
        "FOREIGN KEY (author_id) REFERENCES Author (id), UNIQUE (title, author_id)"
    );
    assert_eq!(
        book::table::schema().references().collect::<Vec<_>>(),
        vec!["Author"]
    );
    assert_eq!(
        shelf_entry::table::schema().constraints_ddl(),
        "PRIMARY KEY (shelf, position)"
    );
}

#[test]
fn create_table_statement() {
    assert_eq!(
        schema::<author::table>().create_table(false).text,
        "CREATE TABLE Author (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT UNIQUE);"
    );
    let sql = schema::<book::table>().create_table(true);
    assert!(sql.text.starts_with("CREATE TABLE IF NOT EXISTS Book (id INTEGER PRIMARY KEY, "));
    assert!(sql.text.ends_with(", UNIQUE (title, author_id));"));
    assert!(sql.binds.is_empty());
}

#[test]
fn add_column_statement() {
    let schema = book::table::schema();
    assert_eq!(
        schema.add_column(book::rating::info()).text,
        "ALTER TABLE Book ADD COLUMN rating REAL;"
    );
}

#[test]
fn generated_ddl_is_accepted_by_sqlite() {
    let db = Database::open_in_memory().unwrap();
    for schema in [author::table::schema(), book::table::schema()] {
        db.execute(&schema.create_table(false)).unwrap();
    }
    let tables: Vec<String> = db
        .query(
            &Sql::new("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name;"),
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, vec!["Author", "Book"]);
}
