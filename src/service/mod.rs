//! RecordService: CRUD and metadata execution using the safe SQL builder.

mod records;

pub use records::RecordService;
