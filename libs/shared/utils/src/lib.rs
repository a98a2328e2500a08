pub mod normalize;
pub mod rows;

pub use normalize::{
    normalize_text, normalize_time, normalize_weekday, parse_date, strip_accents, NormalizeError,
};
pub use rows::{CellValue, SheetRow};
