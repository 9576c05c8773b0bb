use jiff::civil::DateTime;
use rivet::{DeclaredTy, Model, ModelDef};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct User {
    pub id: Option<i64>,
    pub name: String,
    pub age: i32,
}

rivet::record!(User {
    id: "ID",
    name: "Name",
    age: "Age",
});

impl Model for User {
    fn schema() -> ModelDef {
        ModelDef::new("app", "User")
            .field("ID", DeclaredTy::I64, "pk;auto")
            .field("Name", DeclaredTy::String, "size=64")
            .field("Age", DeclaredTy::I32, "index")
            .field("Groups", DeclaredTy::list_of("app.Group"), "rel=m2m")
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Group {
    pub id: Option<i64>,
    pub name: String,
}

rivet::record!(Group {
    id: "ID",
    name: "Name",
});

impl Model for Group {
    fn schema() -> ModelDef {
        ModelDef::new("app", "Group")
            .field("ID", DeclaredTy::I64, "pk;auto")
            .field("Name", DeclaredTy::String, "unique")
            .field("Users", DeclaredTy::list_of("app.User"), "reverse=many")
    }
}

/// Versioned, with a timestamp refreshed on every write.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Article {
    pub id: Option<i64>,
    pub title: String,
    pub version: i64,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

rivet::record!(Article {
    id: "ID",
    title: "Title",
    version: "Version",
    created_at: "CreatedAt",
    updated_at: "UpdatedAt",
});

impl Model for Article {
    fn schema() -> ModelDef {
        ModelDef::new("app", "Article")
            .field("ID", DeclaredTy::I64, "pk;auto")
            .field("Title", DeclaredTy::String, "")
            .field("Version", DeclaredTy::I64, "")
            .field("CreatedAt", DeclaredTy::DateTime.optional(), "auto_now_add")
            .field("UpdatedAt", DeclaredTy::DateTime.optional(), "auto_now")
    }
}

/// A model keyed by a natural string key.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub hits: i64,
}

rivet::record!(Tag {
    name: "Name",
    hits: "Hits",
});

impl Model for Tag {
    fn schema() -> ModelDef {
        ModelDef::new("app", "Tag")
            .field("Name", DeclaredTy::String, "pk")
            .field("Hits", DeclaredTy::I64, "")
    }
}
