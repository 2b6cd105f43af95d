pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
/// The recording directory holds no sample file
pub const NO_SAMPLE_FILE: i32 = 2;
