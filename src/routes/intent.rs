//! Route resolution: (method, path segments) to a tagged operation.
//!
//! The resolved `Route` carries path captures only; query parameters and
//! bodies are parsed later, after the permission tier has been checked,
//! so permission errors always win over input errors.

use crate::auth::Action;
use crate::error::AppError;
use axum::http::Method;

/// First path segment that selects the API; anything else gets the
/// static welcome payload.
pub const API_PREFIX: &str = "api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// GET /api itself; authenticated but tier-free.
    ApiIndex,
    ListTables,
    CreateTable,
    DropTable { table: String },
    DropIndex { table: String, index: String },
    InsertRecords { table: String },
    GetRecords { table: String },
    GetRecord { table: String, id: String },
    UpdateRecord { table: String, id: String },
    DeleteRecord { table: String, id: String },
    Count { table: String },
    MaxId { table: String },
}

impl Route {
    pub fn action(&self) -> Action {
        match self {
            Route::ApiIndex
            | Route::ListTables
            | Route::GetRecords { .. }
            | Route::GetRecord { .. }
            | Route::Count { .. }
            | Route::MaxId { .. } => Action::Read,
            Route::CreateTable
            | Route::DropTable { .. }
            | Route::DropIndex { .. }
            | Route::InsertRecords { .. }
            | Route::UpdateRecord { .. }
            | Route::DeleteRecord { .. } => Action::Write,
        }
    }

    /// Operation name used in permission-error messages.
    pub fn operation(&self) -> &'static str {
        match self {
            Route::ApiIndex => "welcome",
            Route::ListTables => "listTables",
            Route::CreateTable => "createTable",
            Route::DropTable { .. } => "dropTable",
            Route::DropIndex { .. } => "dropIndex",
            Route::InsertRecords { .. } => "insert",
            Route::GetRecords { .. } => "list",
            Route::GetRecord { .. } => "getById",
            Route::UpdateRecord { .. } => "update",
            Route::DeleteRecord { .. } => "delete",
            Route::Count { .. } => "count",
            Route::MaxId { .. } => "maxId",
        }
    }
}

pub fn is_api_path(path: &str) -> bool {
    path.split('/').find(|s| !s.is_empty()) == Some(API_PREFIX)
}

/// Resolve a path under the API prefix. Unknown shapes are 404; known
/// shapes with a disallowed method are 405.
pub fn resolve(method: &Method, path: &str) -> Result<Route, AppError> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    debug_assert_eq!(segments.first(), Some(&API_PREFIX));
    let rest = &segments[1..];
    Ok(match rest {
        [] if *method == Method::GET => Route::ApiIndex,
        [] => return Err(AppError::MethodNotAllowed("/api".into())),
        ["tables"] if *method == Method::GET => Route::ListTables,
        ["tables"] => return Err(AppError::MethodNotAllowed("/api/tables".into())),
        ["tables", name] if *method == Method::DELETE => Route::DropTable {
            table: (*name).to_string(),
        },
        ["tables", _] => return Err(AppError::MethodNotAllowed("/api/tables/:name".into())),
        ["create-table"] if *method == Method::POST => Route::CreateTable,
        ["create-table"] => return Err(AppError::MethodNotAllowed("/api/create-table".into())),
        [table, "index", index] if *method == Method::DELETE => Route::DropIndex {
            table: (*table).to_string(),
            index: (*index).to_string(),
        },
        [_, "index", _] => {
            return Err(AppError::MethodNotAllowed(
                "/api/:table/index/:indexName".into(),
            ))
        }
        [table, "count"] if *method == Method::GET => Route::Count {
            table: (*table).to_string(),
        },
        [_, "count"] => return Err(AppError::MethodNotAllowed("/api/:table/count".into())),
        [table, "max_id"] if *method == Method::GET => Route::MaxId {
            table: (*table).to_string(),
        },
        [_, "max_id"] => return Err(AppError::MethodNotAllowed("/api/:table/max_id".into())),
        [table, "records"] if *method == Method::POST => Route::InsertRecords {
            table: (*table).to_string(),
        },
        [table, "records"] if *method == Method::GET => Route::GetRecords {
            table: (*table).to_string(),
        },
        [_, "records"] => return Err(AppError::MethodNotAllowed("/api/:table/records".into())),
        [table, "records", id] if *method == Method::GET => Route::GetRecord {
            table: (*table).to_string(),
            id: (*id).to_string(),
        },
        [table, "records", id] if *method == Method::PUT => Route::UpdateRecord {
            table: (*table).to_string(),
            id: (*id).to_string(),
        },
        [table, "records", id] if *method == Method::DELETE => Route::DeleteRecord {
            table: (*table).to_string(),
            id: (*id).to_string(),
        },
        [_, "records", _] => {
            return Err(AppError::MethodNotAllowed(
                "/api/:table/records/:id".into(),
            ))
        }
        _ => return Err(AppError::NotFound("invalid path".into())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_prefix_detection() {
        assert!(is_api_path("/api"));
        assert!(is_api_path("/api/tables"));
        assert!(!is_api_path("/"));
        assert!(!is_api_path("/apis"));
        assert!(!is_api_path("/other/api"));
    }

    #[test]
    fn resolves_table_administration() {
        assert_eq!(
            resolve(&Method::GET, "/api/tables").unwrap(),
            Route::ListTables
        );
        assert_eq!(
            resolve(&Method::DELETE, "/api/tables/widgets").unwrap(),
            Route::DropTable {
                table: "widgets".into()
            }
        );
        assert_eq!(
            resolve(&Method::POST, "/api/create-table").unwrap(),
            Route::CreateTable
        );
        assert_eq!(
            resolve(&Method::DELETE, "/api/widgets/index/idx_widgets_c1").unwrap(),
            Route::DropIndex {
                table: "widgets".into(),
                index: "idx_widgets_c1".into()
            }
        );
    }

    #[test]
    fn resolves_record_operations() {
        assert_eq!(
            resolve(&Method::POST, "/api/widgets/records").unwrap(),
            Route::InsertRecords {
                table: "widgets".into()
            }
        );
        assert_eq!(
            resolve(&Method::GET, "/api/widgets/records/7").unwrap(),
            Route::GetRecord {
                table: "widgets".into(),
                id: "7".into()
            }
        );
        assert_eq!(
            resolve(&Method::PUT, "/api/widgets/records/7").unwrap(),
            Route::UpdateRecord {
                table: "widgets".into(),
                id: "7".into()
            }
        );
        assert_eq!(
            resolve(&Method::GET, "/api/widgets/count").unwrap(),
            Route::Count {
                table: "widgets".into()
            }
        );
        assert_eq!(
            resolve(&Method::GET, "/api/widgets/max_id").unwrap(),
            Route::MaxId {
                table: "widgets".into()
            }
        );
    }

    #[test]
    fn known_shape_wrong_method_is_405() {
        for (method, path) in [
            (Method::POST, "/api/tables"),
            (Method::GET, "/api/create-table"),
            (Method::PATCH, "/api/widgets/records/7"),
            (Method::PUT, "/api/widgets/records"),
            (Method::POST, "/api/widgets/count"),
            (Method::DELETE, "/api"),
        ] {
            let err = resolve(&method, path).unwrap_err();
            assert!(
                matches!(err, AppError::MethodNotAllowed(_)),
                "{} {} should be 405",
                method,
                path
            );
        }
    }

    #[test]
    fn unknown_shape_is_404() {
        for path in ["/api/widgets", "/api/widgets/records/7/extra", "/api/a/b"] {
            let err = resolve(&Method::GET, path).unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)), "{} should be 404", path);
        }
    }

    #[test]
    fn write_operations_require_the_write_tier() {
        assert_eq!(
            resolve(&Method::POST, "/api/widgets/records")
                .unwrap()
                .action(),
            Action::Write
        );
        assert_eq!(
            resolve(&Method::GET, "/api/widgets/records")
                .unwrap()
                .action(),
            Action::Read
        );
        assert_eq!(
            resolve(&Method::DELETE, "/api/tables/widgets")
                .unwrap()
                .action(),
            Action::Write
        );
    }
}
