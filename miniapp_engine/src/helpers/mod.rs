mod init_data;

pub use init_data::{parse_legacy_test_params, InitData, InitDataError};
