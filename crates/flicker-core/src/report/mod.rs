pub mod json;
pub mod plot;
pub mod table;

pub use json::{read_summary_json, write_summary_json};
pub use plot::write_plots;
pub use table::{read_table, write_image_table, write_statistic_tables, write_table, Statistic, TableRow};
