// Infrastructure adapters implementing the application ports

pub mod excel_report_adapter;
pub mod http_client;
pub mod json_report_adapter;
pub mod tmdb_catalog_adapter;

pub use excel_report_adapter::ExcelReportAdapter;
pub use json_report_adapter::JsonReportAdapter;
pub use tmdb_catalog_adapter::TmdbCatalogAdapter;
