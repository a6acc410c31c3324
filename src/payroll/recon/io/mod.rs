pub mod excel_write;
pub mod settings;
pub mod store;
pub mod workbook;
