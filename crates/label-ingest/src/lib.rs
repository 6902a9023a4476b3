pub mod csv_table;

pub use csv_table::{
    IngestOptions, read_table, read_table_from, read_table_with_options, write_table,
    write_table_to,
};
