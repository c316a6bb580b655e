//! Receipt documents: payload model, layouts, and print jobs

mod jobs;
mod model;
mod renderer;

pub use jobs::{
    PrintJob, PrintRequest, RenderedJob, build_test_page, build_text_document, render_request,
};
pub use model::{
    ChangeInfo, ChangeStatus, DEFAULT_QUANTITY_UNIT, ItemKind, LineItem, ReceiptDocument,
    ReceiptFooter, ReceiptHeader, ReceiptStats, ReceiptType,
};
pub use renderer::{ReceiptRenderer, build_document, build_document_json};
