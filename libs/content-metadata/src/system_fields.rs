//! The system fields every content type exposes, with their schema names
//! and physical column names.

pub struct SystemField {
    pub name: &'static str,
    pub db_name: &'static str,
    pub description: &'static str,
}

pub const ID: SystemField = SystemField {
    name: "Id",
    db_name: "content_item_id",
    description: "Row identifier",
};

pub const STATUS_TYPE_ID: SystemField = SystemField {
    name: "StatusTypeId",
    db_name: "status_type_id",
    description: "Workflow status",
};

pub const CREATED: SystemField = SystemField {
    name: "Created",
    db_name: "created",
    description: "Creation date",
};

pub const MODIFIED: SystemField = SystemField {
    name: "Modified",
    db_name: "modified",
    description: "Last modification date",
};

pub const LAST_MODIFIED_BY: SystemField = SystemField {
    name: "LastModifiedBy",
    db_name: "last_modified_by",
    description: "Id of the user who last modified the row",
};

pub const ALL: [&SystemField; 5] = [&ID, &STATUS_TYPE_ID, &CREATED, &MODIFIED, &LAST_MODIFIED_BY];
