//! Invoice line routes under `/api/new-invoices`

pub mod handlers;

pub use handlers::{
    create_invoice_line, create_invoice_line_table, get_invoice_line, list_invoice_lines,
};
