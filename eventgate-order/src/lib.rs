pub mod barcode;
pub mod placement;

pub use barcode::{format_barcode, BarcodeSource, RandomBarcodes, BARCODE_MAX};
pub use placement::{PlacementError, PlacementOutcome, PlacementWorkflow, MAX_BOOKING_ATTEMPTS};
