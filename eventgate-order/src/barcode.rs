use rand::Rng;

/// Upper bound (inclusive) of the barcode number space.
pub const BARCODE_MAX: u32 = 99_999_999;

/// Render a barcode number as exactly 8 decimal digits, left-padded with '0'.
pub fn format_barcode(n: u32) -> String {
    format!("{:08}", n)
}

/// Source of candidate barcodes. Yields format-valid candidates only;
/// uniqueness against the order store is the caller's responsibility.
pub trait BarcodeSource: Send + Sync {
    fn draw(&self) -> String;
}

/// Production source: uniform draw over `[1, 99_999_999]`.
pub struct RandomBarcodes;

impl BarcodeSource for RandomBarcodes {
    fn draw(&self) -> String {
        format_barcode(rand::thread_rng().gen_range(1..=BARCODE_MAX))
    }
}
