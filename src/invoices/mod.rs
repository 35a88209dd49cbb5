//! Supplier invoice routes
//!
//! CRUD over `catalogservice_supplierinvoice` under `/api/invoices`.

pub mod handlers;

pub use handlers::{
    create_invoice, delete_all_invoices, delete_invoice, get_invoice, list_invoices,
    patch_invoice, replace_invoice,
};
